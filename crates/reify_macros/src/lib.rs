use quote::{format_ident, quote};

mod parse;

// We expect the data structures we emit to be declared in this module of the common crate.
#[allow(non_snake_case)]
fn DATA_MODULE() -> proc_macro2::TokenStream {
    "crate::data::primitive".parse().unwrap()
}

fn declare_kind_enum(kinds: &[parse::Kind]) -> proc_macro2::TokenStream {
    let data_module = DATA_MODULE();
    let count = kinds.len();
    let attrs = kinds.iter().map(|k| &k.attrs).collect::<Vec<_>>();
    let names = kinds.iter().map(|k| &k.name.inner).collect::<Vec<_>>();
    let natives = kinds.iter().map(|k| &k.native).collect::<Vec<_>>();
    let defaults = kinds.iter().map(|k| &k.default).collect::<Vec<_>>();

    let name_strs = names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    let native_strs = name_strs.iter().map(|n| n.to_lowercase()).collect::<Vec<_>>();
    let wrapper_strs = name_strs
        .iter()
        .map(|n| format!("{}Array", n))
        .collect::<Vec<_>>();
    let boxed_strs = kinds
        .iter()
        .map(|k| k.boxed.inner.to_string())
        .collect::<Vec<_>>();

    quote! {
        /// The closed set of primitive element kinds with a native array representation.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum PrimitiveKind {
            #(#(#attrs)* #names,)*
        }

        impl PrimitiveKind {
            pub const ALL: [PrimitiveKind; #count] = [#(PrimitiveKind::#names),*];

            pub fn name(self) -> &'static str {
                match self {
                    #(PrimitiveKind::#names => #name_strs,)*
                }
            }

            /// The host's spelling of the element type, e.g. `int` in `int[]`.
            pub fn native_name(self) -> &'static str {
                match self {
                    #(PrimitiveKind::#names => #native_strs,)*
                }
            }

            pub fn wrapper_name(self) -> &'static str {
                match self {
                    #(PrimitiveKind::#names => #wrapper_strs,)*
                }
            }

            pub fn boxed_name(self) -> &'static str {
                match self {
                    #(PrimitiveKind::#names => #boxed_strs,)*
                }
            }

            pub fn default_value(self) -> PrimValue {
                match self {
                    #(PrimitiveKind::#names => PrimValue::#names(#defaults),)*
                }
            }

            pub fn unbox(self, value: &#data_module::Boxed) -> Option<PrimValue> {
                match self {
                    #(PrimitiveKind::#names => {
                        <#natives as #data_module::Primitive>::from_boxed(value).map(PrimValue::#names)
                    })*
                }
            }
        }

        impl ::std::fmt::Display for PrimitiveKind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.native_name())
            }
        }
    }
}

fn declare_value_enum(kinds: &[parse::Kind]) -> proc_macro2::TokenStream {
    let data_module = DATA_MODULE();
    let names = kinds.iter().map(|k| &k.name.inner).collect::<Vec<_>>();
    let natives = kinds.iter().map(|k| &k.native).collect::<Vec<_>>();

    quote! {
        /// A single unboxed element of some primitive kind.
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub enum PrimValue {
            #(#names(#natives),)*
        }

        impl PrimValue {
            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    #(PrimValue::#names(_) => PrimitiveKind::#names,)*
                }
            }

            pub fn into_boxed(self) -> #data_module::Boxed {
                match self {
                    #(PrimValue::#names(inner) => #data_module::Primitive::into_boxed(inner),)*
                }
            }
        }
    }
}

fn declare_primitive_impl(kind: &parse::Kind) -> proc_macro2::TokenStream {
    let data_module = DATA_MODULE();
    let name = &kind.name.inner;
    let native = &kind.native;
    let boxed = &kind.boxed.inner;
    let default = &kind.default;

    let slot = &kind.slot;
    let (encode, decode) = match kind.encoding {
        parse::SlotEncoding::Direct => (quote! { value }, quote! { raw }),
        parse::SlotEncoding::Bits => (
            quote! { value.to_bits() },
            quote! { <#native>::from_bits(raw) },
        ),
        // Slots are only ever written from valid elements, so decoding cannot fail.
        parse::SlotEncoding::Scalar => (
            quote! { u32::from(value) },
            quote! { <#native>::from_u32(raw).unwrap_or_default() },
        ),
    };

    let narrow = match kind.narrowing {
        parse::Narrowing::Checked => quote! {
            ::core::convert::TryFrom::try_from(*inner).ok()
        },
        parse::Narrowing::Cast => quote! {
            Some(*inner as #native)
        },
    };

    quote! {
        impl #data_module::Primitive for #native {
            const KIND: PrimitiveKind = PrimitiveKind::#name;

            type Slot = ::std::sync::atomic::#slot;

            fn default_value() -> Self {
                #default
            }

            fn into_boxed(self) -> #data_module::Boxed {
                #data_module::Boxed::#boxed(self.into())
            }

            fn from_boxed(value: &#data_module::Boxed) -> Option<Self> {
                match value {
                    #data_module::Boxed::#boxed(inner) => #narrow,
                    _ => None,
                }
            }

            fn new_slot(self) -> Self::Slot {
                let value = self;
                ::std::sync::atomic::#slot::new(#encode)
            }

            fn load(slot: &Self::Slot) -> Self {
                let raw = slot.load(::std::sync::atomic::Ordering::Relaxed);
                #decode
            }

            fn store(slot: &Self::Slot, value: Self) {
                slot.store(#encode, ::std::sync::atomic::Ordering::Relaxed)
            }

            fn into_value(self) -> PrimValue {
                PrimValue::#name(self)
            }

            fn from_value(value: PrimValue) -> Option<Self> {
                match value {
                    PrimValue::#name(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    }
}

// Emitted as exported `macro_rules!` so that downstream crates can stamp out per-kind items
// (enum variants, match arms) without listing the kinds again. They are only usable by path from
// other crates.
fn declare_kind_macros(kinds: &[parse::Kind]) -> proc_macro2::TokenStream {
    let names = kinds.iter().map(|k| &k.name.inner).collect::<Vec<_>>();
    let natives = kinds.iter().map(|k| &k.native).collect::<Vec<_>>();
    let wrappers = names
        .iter()
        .map(|name| format_ident!("{}Array", name))
        .collect::<Vec<_>>();

    quote! {
        /// Invokes `$callback!` once with the whole kind table, as a comma-separated list of
        /// `Name(native) NameArray` entries.
        #[macro_export]
        macro_rules! for_each_primitive_kind {
            ($callback:ident) => {
                $callback! { #(#names(#natives) #wrappers,)* }
            };
        }

        /// Evaluates `$body` with `$K` bound to the native element type of the `PrimitiveKind`
        /// `$kind`.
        #[macro_export]
        macro_rules! with_primitive_type {
            ($kind:expr, $K:ident => $body:expr) => {
                match $kind {
                    #($crate::data::primitive::PrimitiveKind::#names => {
                        type $K = #natives;
                        $body
                    })*
                }
            };
        }
    }
}

/// Expands a table of primitive kinds into the `PrimitiveKind` enum, the `PrimValue` enum and one
/// `Primitive` impl per native element type, along with the `for_each_primitive_kind!` and
/// `with_primitive_type!` macros for use by other crates. Every per-kind item the bridge needs is
/// derived from this single table.
#[proc_macro]
pub fn declare_primitive_kinds(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as parse::Input);

    let kind_enum = declare_kind_enum(&input.kinds);
    let value_enum = declare_value_enum(&input.kinds);
    let kind_macros = declare_kind_macros(&input.kinds);
    let impls = input
        .kinds
        .iter()
        .map(declare_primitive_impl)
        .collect::<Vec<_>>();

    proc_macro::TokenStream::from(quote! {
        #kind_enum
        #value_enum
        #(#impls)*
        #kind_macros
    })
}
