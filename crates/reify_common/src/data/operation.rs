use serde::Serialize;
use std::fmt;

/// The operations a primitive-array wrapper declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Operation {
    Construct,
    Get,
    Set,
    Length,
    CopyTo,
    ToGenericView,
    FromGenericView,
    ReifiedType,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Construct,
        Operation::Get,
        Operation::Set,
        Operation::Length,
        Operation::CopyTo,
        Operation::ToGenericView,
        Operation::FromGenericView,
        Operation::ReifiedType,
    ];

    /// The member name the front-end sees.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Construct => "new",
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Length => "size",
            Operation::CopyTo => "copyTo",
            Operation::ToGenericView => "array",
            Operation::FromGenericView => "from",
            Operation::ReifiedType => "$getType$",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
