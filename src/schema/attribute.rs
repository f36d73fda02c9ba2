use std::fmt;

/// DynamoDB wire type of an attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeType {
    /// `S`
    String,
    /// `N`
    Number,
    /// `B`
    Binary,
    /// `BOOL`
    Bool,
    /// `SS`
    StringSet,
    /// `NS`
    NumberSet,
    /// `BS`
    BinarySet,
    /// `L`
    List,
    /// `M`
    Map,
    /// `NULL`
    Null,
}

impl AttributeType {
    /// Every supported type.
    pub const ALL: [Self; 10] = [
        Self::String,
        Self::Number,
        Self::Binary,
        Self::Bool,
        Self::StringSet,
        Self::NumberSet,
        Self::BinarySet,
        Self::List,
        Self::Map,
        Self::Null,
    ];

    /// Parse a wire type tag. Tags are case sensitive, as in DynamoDB.
    pub fn from_wire(wire_type: &str) -> Option<Self> {
        let attribute_type = match wire_type {
            "S" => Self::String,
            "N" => Self::Number,
            "B" => Self::Binary,
            "BOOL" => Self::Bool,
            "SS" => Self::StringSet,
            "NS" => Self::NumberSet,
            "BS" => Self::BinarySet,
            "L" => Self::List,
            "M" => Self::Map,
            "NULL" => Self::Null,
            _ => return None,
        };
        Some(attribute_type)
    }

    /// The wire type tag.
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
            Self::Bool => "BOOL",
            Self::StringSet => "SS",
            Self::NumberSet => "NS",
            Self::BinarySet => "BS",
            Self::List => "L",
            Self::Map => "M",
            Self::Null => "NULL",
        }
    }

    /// Whether DynamoDB accepts the type for a table or index key.
    pub const fn is_key_type(self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Binary)
    }

    /// Whether a value of this type has a string form usable in a composite key.
    pub const fn is_composite_part_type(self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Bool)
    }

    /// Whether `subtype` is a valid representation hint for this type.
    pub const fn accepts_subtype(self, subtype: Subtype) -> bool {
        match self {
            Self::String | Self::StringSet => matches!(subtype, Subtype::String),
            Self::Number | Self::NumberSet => subtype.is_numeric(),
            Self::Binary | Self::BinarySet => matches!(subtype, Subtype::Bytes),
            Self::Bool => matches!(subtype, Subtype::Bool),
            Self::List | Self::Map | Self::Null => false,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Native representation hint for an attribute (or the elements of a set).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Subtype {
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Byte string.
    Bytes,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl Subtype {
    /// Parse a subtype hint.
    pub fn parse(subtype: &str) -> Option<Self> {
        let subtype = match subtype {
            "string" => Self::String,
            "bool" => Self::Bool,
            "bytes" => Self::Bytes,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            _ => return None,
        };
        Some(subtype)
    }

    /// The hint as written in a schema description.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Whether the hint is a number representation.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64)
    }

    /// Whether the hint is an integer representation.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Inclusive range of an integer hint, `None` for other hints.
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Self::I8 => (i8::MIN as i128, i8::MAX as i128),
            Self::I16 => (i16::MIN as i128, i16::MAX as i128),
            Self::I32 => (i32::MIN as i128, i32::MAX as i128),
            Self::I64 => (i64::MIN as i128, i64::MAX as i128),
            Self::U8 => (0, u8::MAX as i128),
            Self::U16 => (0, u16::MAX as i128),
            Self::U32 => (0, u32::MAX as i128),
            Self::U64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated table column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    /// The attribute name as stored in DynamoDB.
    pub name: String,
    /// The wire type.
    pub attribute_type: AttributeType,
    /// Optional representation hint.
    pub subtype: Option<Subtype>,
    /// Sanitized identifier for generated code and expression placeholders.
    pub identifier: String,
}
