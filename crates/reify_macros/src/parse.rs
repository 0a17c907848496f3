use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Error, Ident, Lit, Token, Type};

#[derive(Clone, Debug)]
pub struct UpperName {
    pub inner: Ident,
}

impl Parse for UpperName {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident: Ident = input.parse()?;
        if ident.to_string().chars().next().unwrap().is_uppercase() {
            Ok(UpperName { inner: ident })
        } else {
            Err(Error::new(ident.span(), "expected uppercase identifier"))
        }
    }
}

/// How a boxed value is narrowed back into the native element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Narrowing {
    /// `TryFrom`; values outside the native range are rejected.
    Checked,
    /// `as` cast; every boxed value of the right shape is accepted.
    Cast,
}

/// How an element is stored in the atomic slot type of its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotEncoding {
    /// The atomic type holds the element itself.
    Direct,
    /// The atomic type holds `to_bits()` of the element.
    Bits,
    /// The atomic type holds the element's scalar value.
    Scalar,
}

/// One primitive kind, written as
///
/// ```text
/// Short(i16) boxed Integer = 0 in AtomicI16;
/// Float(f32) boxed Float as = 0.0 in AtomicU32 by bits;
/// ```
#[derive(Clone, Debug)]
pub struct Kind {
    pub attrs: Vec<Attribute>,
    pub name: UpperName,
    pub native: Type,
    pub boxed: UpperName,
    pub narrowing: Narrowing,
    pub default: Lit,
    pub slot: Ident,
    pub encoding: SlotEncoding,
}

impl Parse for Kind {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let name = input.parse()?;

        let content;
        let _paren_token = syn::parenthesized!(content in input);
        let native = content.parse()?;

        let boxed_kw: Ident = input.parse()?;
        if boxed_kw != "boxed" {
            return Err(Error::new(boxed_kw.span(), "expected `boxed`"));
        }
        let boxed = input.parse()?;

        let narrowing = if input.peek(Token![as]) {
            let _as_token: Token![as] = input.parse()?;
            Narrowing::Cast
        } else {
            Narrowing::Checked
        };

        let _eq_token: Token![=] = input.parse()?;
        let default = input.parse()?;

        let _in_token: Token![in] = input.parse()?;
        let slot = input.parse()?;
        let encoding = if input.peek(Token![;]) {
            SlotEncoding::Direct
        } else {
            let by_kw: Ident = input.parse()?;
            if by_kw != "by" {
                return Err(Error::new(by_kw.span(), "expected `by` or `;`"));
            }
            let encoding_kw: Ident = input.parse()?;
            if encoding_kw == "bits" {
                SlotEncoding::Bits
            } else if encoding_kw == "scalar" {
                SlotEncoding::Scalar
            } else {
                return Err(Error::new(
                    encoding_kw.span(),
                    "expected `bits` or `scalar`",
                ));
            }
        };
        let _semi_token: Token![;] = input.parse()?;

        Ok(Kind {
            attrs,
            name,
            native,
            boxed,
            narrowing,
            default,
            slot,
            encoding,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Input {
    pub kinds: Vec<Kind>,
}

impl Parse for Input {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut kinds = Vec::new();
        while !input.is_empty() {
            kinds.push(input.parse()?);
        }
        if kinds.is_empty() {
            return Err(input.error("expected at least one primitive kind"));
        }
        Ok(Input { kinds })
    }
}
