use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Ident(pub String);

impl Ident {
    pub fn new(name: &str) -> Self {
        Ident(name.to_owned())
    }
}

#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub class: Class,
}

#[derive(Clone, Debug)]
pub struct Class {
    pub is_final: bool,
    pub name: Ident,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug)]
pub struct Arg {
    pub name: Ident,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct Data {
    pub is_static: bool,
    pub is_final: bool,
    pub name: Ident,
    pub ty: Type,
    pub init: Expr,
}

#[derive(Clone, Debug)]
pub struct Method {
    pub is_static: bool,
    pub name: Ident,
    pub args: Vec<Arg>,
    pub ret_ty: Option<Type>,
    pub body: Block,
}

#[derive(Clone, Debug)]
pub struct Constructor {
    pub name: Ident,
    pub args: Vec<Arg>,
    pub body: Block,
}

#[derive(Clone, Debug)]
pub enum Field {
    Data(Data),
    Constructor(Constructor),
    Method(Method),
}

#[derive(Clone, Debug)]
pub enum Type {
    Ref(RefType),
    Val(ValType),
}

impl Type {
    pub fn int() -> Type {
        Type::Val(ValType::Int)
    }

    pub fn long() -> Type {
        Type::Val(ValType::Long)
    }

    pub fn class(name: &str) -> Type {
        Type::Ref(RefType::ClassOrInterface(Ident::new(name)))
    }

    pub fn object() -> Type {
        Type::class("Object")
    }

    pub fn array(&self) -> Type {
        Type::Ref(RefType::Array(Box::new(self.clone())))
    }
}

#[derive(Clone, Debug)]
pub enum RefType {
    ClassOrInterface(Ident),
    Array(Box<Type>),
}

#[derive(Clone, Copy, Debug)]
pub enum ValType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

#[derive(Clone, Copy, Debug)]
pub enum BinOp {
    Lt,
    Sub,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Assign(Box<Expr>, Box<Expr>),
    Null,
    Ident(Ident),
    New(Type, Vec<Expr>),
    /// `new int[size]`
    NewArray(Type, Box<Expr>),
    /// `new Object[] { a, b }`
    ArrayInit(Type, Vec<Expr>),
    Cast(Type, Box<Expr>),
    ClassLit(Type),
    ArrayAccess(Box<Expr>, Box<Expr>),
    Field(Box<Expr>, Ident),
    Call(Ident, Vec<Expr>),
    MethodCall(Box<Expr>, Ident, Vec<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    PostIncrement(Box<Expr>),
    BooleanLit(bool),
    IntLit(i32),
    LongLit(i64),
    FloatLit(f32),
    DoubleLit(f64),
    CharLit(u16),
    StringLit(String),
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(Ident::new(name))
    }

    /// `obj.method(args)`, where `obj` is a name: a local or a class.
    pub fn call(obj: &str, method: &str, args: Vec<Expr>) -> Self {
        Expr::MethodCall(Box::new(Expr::ident(obj)), Ident::new(method), args)
    }

    pub fn field(obj: Expr, name: &str) -> Self {
        Expr::Field(Box::new(obj), Ident::new(name))
    }

    pub fn cast(ty: Type, expr: Expr) -> Self {
        Expr::Cast(ty, Box::new(expr))
    }

    pub fn index(array: Expr, index: Expr) -> Self {
        Expr::ArrayAccess(Box::new(array), Box::new(index))
    }

    pub fn bin_op(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinOp(op, Box::new(lhs), Box::new(rhs))
    }

    /// Whether this expression must be parenthesized when used as an operand.
    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expr::Assign(..) | Expr::Cast(..) | Expr::BinOp(..) | Expr::PostIncrement(..)
        )
    }
}

#[derive(Clone, Debug)]
pub struct Block(pub Rc<RefCell<Vec<Stmt>>>);

impl Block {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(vec![])))
    }

    pub fn from_stmt(stmt: Stmt) -> Self {
        let block = Self::new();
        block.push(stmt);
        block
    }

    pub fn push(&self, stmt: Stmt) {
        self.0.borrow_mut().push(stmt);
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct DeclVar {
    pub is_final: bool,
    pub name: Ident,
    pub ty: Type,
    pub expr: Expr,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    DeclVar(DeclVar),
    For(DeclVar, Expr, Expr, Block),
    Expr(Expr),
    Return(Option<Expr>),
    Throw(Expr),
}

pub trait WriteTo {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error>;
}

pub struct WriteContext {
    indent_width: u32,
    indent_level: u32,
}

impl WriteContext {
    pub fn new(indent_width: u32) -> Self {
        Self {
            indent_width,
            indent_level: 0,
        }
    }

    fn newline(&self) -> String {
        let mut newline = String::new();
        newline.push('\n');
        for _ in 0..self.indent_level {
            newline.push(' ');
        }
        newline
    }

    fn write_line(&mut self, w: &mut impl Write) -> Result<(), std::io::Error> {
        w.write_all(b"\n")?;
        for _ in 0..self.indent_level {
            w.write_all(b" ")?;
        }
        Ok(())
    }

    fn write_block<W: Write>(
        &mut self,
        w: &mut W,
        f: impl FnOnce(&mut Self, &mut W) -> Result<(), std::io::Error>,
    ) -> Result<(), std::io::Error> {
        w.write_all(b"{")?;

        let original = self.indent_level;
        self.indent_level += self.indent_width;
        self.write_line(w)?;

        f(self, w)?;

        self.indent_level = original;
        self.write_line(w)?;

        w.write_all(b"}")?;
        Ok(())
    }

    fn write_separated<'a, 'b, W, T, I>(
        &mut self,
        sep: &'a str,
        items: I,
        w: &mut W,
    ) -> Result<(), std::io::Error>
    where
        W: Write,
        T: WriteTo + 'b,
        I: Iterator<Item = &'b T>,
    {
        for (i, item) in items.enumerate() {
            if i > 0 {
                w.write_all(sep.as_bytes())?;
            }
            item.write_to(self, w)?;
        }
        Ok(())
    }

    fn write_operand(&mut self, expr: &Expr, w: &mut impl Write) -> Result<(), std::io::Error> {
        if expr.is_compound() {
            w.write_all(b"(")?;
            expr.write_to(self, w)?;
            w.write_all(b")")
        } else {
            expr.write_to(self, w)
        }
    }
}

impl WriteTo for Ident {
    fn write_to(&self, _ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        w.write_all(self.0.as_bytes())
    }
}

impl WriteTo for CompilationUnit {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        if let Some(package) = &self.package {
            writeln!(w, "package {};", package)?;
            writeln!(w)?;
        }
        if !self.imports.is_empty() {
            for import in &self.imports {
                writeln!(w, "import {};", import)?;
            }
            writeln!(w)?;
        }
        self.class.write_to(ctx, w)?;
        writeln!(w)
    }
}

impl WriteTo for Class {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        w.write_all(b"public ")?;
        if self.is_final {
            w.write_all(b"final ")?;
        }
        w.write_all(b"class ")?;
        self.name.write_to(ctx, w)?;
        w.write_all(b" ")?;

        ctx.write_block(w, |ctx, w| {
            let mut sep = ctx.newline();
            sep.insert(0, '\n');
            ctx.write_separated(&sep, self.fields.iter(), w)?;
            Ok(())
        })
    }
}

impl WriteTo for Arg {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        self.ty.write_to(ctx, w)?;
        w.write_all(b" ")?;
        self.name.write_to(ctx, w)
    }
}

impl WriteTo for Data {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        w.write_all(b"public ")?;
        if self.is_static {
            w.write_all(b"static ")?;
        }
        if self.is_final {
            w.write_all(b"final ")?;
        }
        self.ty.write_to(ctx, w)?;
        w.write_all(b" ")?;
        self.name.write_to(ctx, w)?;
        w.write_all(b" = ")?;
        self.init.write_to(ctx, w)?;
        w.write_all(b";")?;
        Ok(())
    }
}

impl WriteTo for Method {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        w.write_all(b"public ")?;
        if self.is_static {
            w.write_all(b"static ")?;
        }

        if let Some(ret_ty) = &self.ret_ty {
            ret_ty.write_to(ctx, w)?;
            w.write_all(b" ")?;
        } else {
            w.write_all(b"void ")?;
        }

        self.name.write_to(ctx, w)?;

        w.write_all(b"(")?;
        ctx.write_separated(", ", self.args.iter(), w)?;
        w.write_all(b") ")?;

        self.body.write_to(ctx, w)?;
        Ok(())
    }
}

impl WriteTo for Constructor {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        w.write_all(b"public ")?;
        self.name.write_to(ctx, w)?;
        w.write_all(b"(")?;
        ctx.write_separated(", ", self.args.iter(), w)?;
        w.write_all(b") ")?;
        self.body.write_to(ctx, w)
    }
}

impl WriteTo for Field {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            Field::Data(data) => data.write_to(ctx, w),
            Field::Constructor(constructor) => constructor.write_to(ctx, w),
            Field::Method(method) => method.write_to(ctx, w),
        }
    }
}

impl WriteTo for Type {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            Type::Ref(ty) => ty.write_to(ctx, w),
            Type::Val(ty) => ty.write_to(ctx, w),
        }
    }
}

impl WriteTo for RefType {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            RefType::ClassOrInterface(name) => name.write_to(ctx, w),
            RefType::Array(ty) => {
                ty.write_to(ctx, w)?;
                w.write_all(b"[]")?;
                Ok(())
            }
        }
    }
}

impl WriteTo for ValType {
    fn write_to(&self, _ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            ValType::Boolean => w.write_all(b"boolean"),
            ValType::Byte => w.write_all(b"byte"),
            ValType::Short => w.write_all(b"short"),
            ValType::Int => w.write_all(b"int"),
            ValType::Long => w.write_all(b"long"),
            ValType::Char => w.write_all(b"char"),
            ValType::Float => w.write_all(b"float"),
            ValType::Double => w.write_all(b"double"),
        }
    }
}

impl WriteTo for BinOp {
    fn write_to(&self, _ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            BinOp::Lt => w.write_all(b"<"),
            BinOp::Sub => w.write_all(b"-"),
        }
    }
}

fn write_char_lit(w: &mut impl Write, c: u16) -> Result<(), std::io::Error> {
    match c {
        0x27 => w.write_all(b"'\\''"),
        0x5C => w.write_all(b"'\\\\'"),
        0x20..=0x7E => write!(w, "'{}'", c as u8 as char),
        _ => write!(w, "'\\u{:04x}'", c),
    }
}

fn write_string_lit(w: &mut impl Write, s: &str) -> Result<(), std::io::Error> {
    w.write_all(b"\"")?;
    for c in s.chars() {
        match c {
            '"' => w.write_all(b"\\\"")?,
            '\\' => w.write_all(b"\\\\")?,
            '\n' => w.write_all(b"\\n")?,
            ' '..='~' => write!(w, "{}", c)?,
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(w, "\\u{:04x}", unit)?;
                }
            }
        }
    }
    w.write_all(b"\"")
}

impl WriteTo for Expr {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            Expr::Assign(lhs, rhs) => {
                lhs.write_to(ctx, w)?;
                w.write_all(b" = ")?;
                rhs.write_to(ctx, w)?;
                Ok(())
            }
            Expr::Null => w.write_all(b"null"),
            Expr::Ident(name) => name.write_to(ctx, w),
            Expr::New(ty, args) => {
                w.write_all(b"new ")?;
                ty.write_to(ctx, w)?;
                w.write_all(b"(")?;
                ctx.write_separated(", ", args.iter(), w)?;
                w.write_all(b")")?;
                Ok(())
            }
            Expr::NewArray(elem_ty, size) => {
                w.write_all(b"new ")?;
                elem_ty.write_to(ctx, w)?;
                w.write_all(b"[")?;
                size.write_to(ctx, w)?;
                w.write_all(b"]")?;
                Ok(())
            }
            Expr::ArrayInit(elem_ty, items) => {
                w.write_all(b"new ")?;
                elem_ty.write_to(ctx, w)?;
                w.write_all(b"[] {")?;
                ctx.write_separated(", ", items.iter(), w)?;
                w.write_all(b"}")?;
                Ok(())
            }
            Expr::Cast(ty, expr) => {
                w.write_all(b"(")?;
                ty.write_to(ctx, w)?;
                w.write_all(b") ")?;
                ctx.write_operand(expr, w)
            }
            Expr::ClassLit(ty) => {
                ty.write_to(ctx, w)?;
                w.write_all(b".class")
            }
            Expr::ArrayAccess(array, index) => {
                ctx.write_operand(array, w)?;
                w.write_all(b"[")?;
                index.write_to(ctx, w)?;
                w.write_all(b"]")?;
                Ok(())
            }
            Expr::Field(obj, field) => {
                ctx.write_operand(obj, w)?;
                w.write_all(b".")?;
                field.write_to(ctx, w)
            }
            Expr::Call(func, args) => {
                func.write_to(ctx, w)?;
                w.write_all(b"(")?;
                ctx.write_separated(", ", args.iter(), w)?;
                w.write_all(b")")?;
                Ok(())
            }
            Expr::MethodCall(obj, method, args) => {
                ctx.write_operand(obj, w)?;
                w.write_all(b".")?;
                method.write_to(ctx, w)?;
                w.write_all(b"(")?;
                ctx.write_separated(", ", args.iter(), w)?;
                w.write_all(b")")?;
                Ok(())
            }
            Expr::BinOp(op, lhs, rhs) => {
                ctx.write_operand(lhs, w)?;
                w.write_all(b" ")?;
                op.write_to(ctx, w)?;
                w.write_all(b" ")?;
                ctx.write_operand(rhs, w)
            }
            Expr::PostIncrement(expr) => {
                ctx.write_operand(expr, w)?;
                w.write_all(b"++")
            }
            Expr::BooleanLit(b) => write!(w, "{}", b),
            Expr::IntLit(n) => write!(w, "{}", n),
            Expr::LongLit(n) => write!(w, "{}L", n),
            Expr::FloatLit(x) => {
                if x.is_nan() {
                    w.write_all(b"Float.NaN")
                } else if x.is_infinite() {
                    let sign = if *x > 0.0 { "POSITIVE" } else { "NEGATIVE" };
                    write!(w, "Float.{}_INFINITY", sign)
                } else {
                    write!(w, "{:?}f", x)
                }
            }
            Expr::DoubleLit(x) => {
                if x.is_nan() {
                    w.write_all(b"Double.NaN")
                } else if x.is_infinite() {
                    let sign = if *x > 0.0 { "POSITIVE" } else { "NEGATIVE" };
                    write!(w, "Double.{}_INFINITY", sign)
                } else {
                    write!(w, "{:?}", x)
                }
            }
            Expr::CharLit(c) => write_char_lit(w, *c),
            Expr::StringLit(s) => write_string_lit(w, s),
        }
    }
}

impl WriteTo for Block {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        ctx.write_block(w, |ctx, w| {
            ctx.write_separated(&ctx.newline(), self.0.borrow().iter(), w)
        })
    }
}

impl WriteTo for DeclVar {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        if self.is_final {
            w.write_all(b"final ")?;
        }
        self.ty.write_to(ctx, w)?;
        w.write_all(b" ")?;
        self.name.write_to(ctx, w)?;
        w.write_all(b" = ")?;
        self.expr.write_to(ctx, w)?;
        Ok(())
    }
}

impl WriteTo for Stmt {
    fn write_to(&self, ctx: &mut WriteContext, w: &mut impl Write) -> Result<(), std::io::Error> {
        match self {
            Stmt::DeclVar(let_) => {
                let_.write_to(ctx, w)?;
                w.write_all(b";")?;
                Ok(())
            }
            Stmt::For(init, cond, update, body) => {
                w.write_all(b"for (")?;
                init.write_to(ctx, w)?;
                w.write_all(b"; ")?;
                cond.write_to(ctx, w)?;
                w.write_all(b"; ")?;
                update.write_to(ctx, w)?;
                w.write_all(b") ")?;
                body.write_to(ctx, w)?;
                Ok(())
            }
            Stmt::Expr(expr) => {
                expr.write_to(ctx, w)?;
                w.write_all(b";")?;
                Ok(())
            }
            Stmt::Return(expr) => {
                w.write_all(b"return")?;
                if let Some(e) = expr {
                    w.write_all(b" ")?;
                    e.write_to(ctx, w)?;
                }
                w.write_all(b";")?;
                Ok(())
            }
            Stmt::Throw(expr) => {
                w.write_all(b"throw ")?;
                expr.write_to(ctx, w)?;
                w.write_all(b";")?;
                Ok(())
            }
        }
    }
}

pub fn to_string<T: WriteTo>(x: &T, indent_width: u32) -> String {
    let mut out = Vec::new();
    let mut ctx = WriteContext::new(indent_width);
    // Writing into a `Vec` cannot fail.
    let _ = x.write_to(&mut ctx, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return() {
        let stmt = Stmt::Return(Some(Expr::LongLit(1)));
        assert_eq!(to_string(&stmt, 2), "return 1L;");

        let stmt = Stmt::Return(None);
        assert_eq!(to_string(&stmt, 2), "return;");
    }

    #[test]
    fn test_operands_are_parenthesized_only_when_compound() {
        let expr = Expr::index(
            Expr::ident("a"),
            Expr::call("Math", "toIntExact", vec![Expr::ident("i")]),
        );
        assert_eq!(to_string(&expr, 2), "a[Math.toIntExact(i)]");

        let expr = Expr::field(Expr::cast(Type::int().array(), Expr::ident("o")), "length");
        assert_eq!(to_string(&expr, 2), "((int[]) o).length");

        let expr = Expr::bin_op(
            BinOp::Sub,
            Expr::field(Expr::ident("a"), "length"),
            Expr::bin_op(BinOp::Sub, Expr::ident("i"), Expr::IntLit(2)),
        );
        assert_eq!(to_string(&expr, 2), "a.length - (i - 2)");
    }

    #[test]
    fn test_literals() {
        assert_eq!(to_string(&Expr::CharLit(b'\'' as u16), 2), "'\\''");
        assert_eq!(to_string(&Expr::CharLit(0xe9), 2), "'\\u00e9'");
        assert_eq!(to_string(&Expr::FloatLit(1.5), 2), "1.5f");
        assert_eq!(to_string(&Expr::DoubleLit(f64::NEG_INFINITY), 2), "Double.NEGATIVE_INFINITY");
        assert_eq!(
            to_string(&Expr::StringLit("say \"hi\"".to_owned()), 2),
            "\"say \\\"hi\\\"\""
        );
        assert_eq!(
            to_string(
                &Expr::ArrayInit(Type::object(), vec![Expr::Null, Expr::BooleanLit(true)]),
                2
            ),
            "new Object[] {null, true}"
        );
    }

    #[test]
    fn test_class() {
        let class = Class {
            is_final: true,
            name: Ident::new("Main"),
            fields: vec![
                Field::Data(Data {
                    is_static: true,
                    is_final: true,
                    name: Ident::new("SIZE"),
                    ty: Type::int(),
                    init: Expr::IntLit(3),
                }),
                Field::Method(Method {
                    is_static: true,
                    name: Ident::new("make"),
                    args: vec![],
                    ret_ty: Some(Type::long().array()),
                    body: Block::from_stmt(Stmt::Return(Some(Expr::NewArray(
                        Type::long(),
                        Box::new(Expr::ident("SIZE")),
                    )))),
                }),
            ],
        };

        let expected = r#"public final class Main {
  public static final int SIZE = 3;

  public static long[] make() {
    return new long[SIZE];
  }
}"#;

        assert_eq!(to_string(&class, 2), expected);
    }

    #[test]
    fn test_for_loop() {
        let body = Block::from_stmt(Stmt::Expr(Expr::Assign(
            Box::new(Expr::index(Expr::ident("a"), Expr::ident("i"))),
            Box::new(Expr::IntLit(0)),
        )));
        let stmt = Stmt::For(
            DeclVar {
                is_final: false,
                name: Ident::new("i"),
                ty: Type::int(),
                expr: Expr::IntLit(0),
            },
            Expr::bin_op(BinOp::Lt, Expr::ident("i"), Expr::field(Expr::ident("a"), "length")),
            Expr::PostIncrement(Box::new(Expr::ident("i"))),
            body,
        );

        let expected = r#"for (int i = 0; i < a.length; i++) {
  a[i] = 0;
}"#;
        assert_eq!(to_string(&stmt, 2), expected);
    }
}
