//! The ORC type tree.

/// The kind of an ORC column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Single-bit logical value, stored in Boolean RLE
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit IEEE-754 floating point
    Float,
    /// 64-bit IEEE-754 floating point
    Double,
    /// Variable-length UTF-8 string
    String,
    /// Variable-length byte sequence
    Binary,
    /// Seconds + nanoseconds relative to the writer's epoch
    Timestamp,
    /// Timestamp pinned to UTC regardless of reader/writer zones
    TimestampInstant,
    /// Days since the UNIX epoch, stored as an integer
    Date,
    /// Bounded-length UTF-8 string
    Varchar,
    /// Fixed-length, blank-padded UTF-8 string
    Char,
    /// Fixed-point decimal with declared precision and scale
    Decimal,
    /// Variable-length sequence of one child type
    List,
    /// Key/value pairs; two children
    Map,
    /// Named fields; one child per field
    Struct,
    /// Tagged choice between children
    Union,
    /// WKB geometry, shares string framing
    Geometry,
    /// WKB geography, shares string framing
    Geography,
}

impl TypeKind {
    /// Whether values of this kind are stored with string framing
    /// (LENGTH + DATA, optionally dictionary encoded).
    pub fn has_string_framing(&self) -> bool {
        matches!(
            self,
            TypeKind::String
                | TypeKind::Binary
                | TypeKind::Char
                | TypeKind::Varchar
                | TypeKind::Geometry
                | TypeKind::Geography
        )
    }
}

/// A node in the ORC type tree.
///
/// Column ids are assigned by [`OrcType::with_ids`] in pre-order, matching
/// the numbering the file format uses for its streams. A tree built by the
/// parser already has its ids assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrcType {
    kind: TypeKind,
    column_id: u64,
    maximum_length: u64,
    precision: u32,
    scale: u32,
    field_names: Vec<String>,
    children: Vec<OrcType>,
}

impl OrcType {
    /// Create a leaf type of the given kind.
    pub fn primitive(kind: TypeKind) -> Self {
        OrcType {
            kind,
            column_id: 0,
            maximum_length: 0,
            precision: 0,
            scale: 0,
            field_names: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a decimal type. A precision of zero marks the Hive 0.11
    /// legacy layout where the file carries no declared precision.
    pub fn decimal(precision: u32, scale: u32) -> Self {
        let mut ty = Self::primitive(TypeKind::Decimal);
        ty.precision = precision;
        ty.scale = scale;
        ty
    }

    /// Create a varchar type with the given maximum length.
    pub fn varchar(maximum_length: u64) -> Self {
        let mut ty = Self::primitive(TypeKind::Varchar);
        ty.maximum_length = maximum_length;
        ty
    }

    /// Create a char type with the given length.
    pub fn char(maximum_length: u64) -> Self {
        let mut ty = Self::primitive(TypeKind::Char);
        ty.maximum_length = maximum_length;
        ty
    }

    /// Create a list type.
    pub fn list_of(element: OrcType) -> Self {
        let mut ty = Self::primitive(TypeKind::List);
        ty.children.push(element);
        ty
    }

    /// Create a map type.
    pub fn map_of(key: OrcType, value: OrcType) -> Self {
        let mut ty = Self::primitive(TypeKind::Map);
        ty.children.push(key);
        ty.children.push(value);
        ty
    }

    /// Create a struct type from named fields.
    pub fn struct_of(fields: Vec<(&str, OrcType)>) -> Self {
        let mut ty = Self::primitive(TypeKind::Struct);
        for (name, child) in fields {
            ty.field_names.push(name.to_string());
            ty.children.push(child);
        }
        ty
    }

    /// Create a union type from its alternatives.
    pub fn union_of(children: Vec<OrcType>) -> Self {
        let mut ty = Self::primitive(TypeKind::Union);
        ty.children = children;
        ty
    }

    /// Assign pre-order column ids over the whole tree, starting at zero.
    ///
    /// Must be called on the root once the tree is fully built; the parser
    /// does this for you.
    pub fn with_ids(mut self) -> Self {
        self.assign_ids(0);
        self
    }

    fn assign_ids(&mut self, mut next: u64) -> u64 {
        self.column_id = next;
        next += 1;
        for child in &mut self.children {
            next = child.assign_ids(next);
        }
        next
    }

    /// The kind of this type.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The pre-order column id of this type.
    pub fn column_id(&self) -> u64 {
        self.column_id
    }

    /// The largest column id in this subtree.
    pub fn maximum_column_id(&self) -> u64 {
        self.children
            .last()
            .map(OrcType::maximum_column_id)
            .unwrap_or(self.column_id)
    }

    /// Declared precision (decimals only; zero otherwise).
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Declared scale (decimals only; zero otherwise).
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Maximum length for char/varchar types.
    pub fn maximum_length(&self) -> u64 {
        self.maximum_length
    }

    /// Number of children.
    pub fn subtype_count(&self) -> usize {
        self.children.len()
    }

    /// The i-th child type.
    pub fn subtype(&self, i: usize) -> &OrcType {
        &self.children[i]
    }

    /// All children.
    pub fn subtypes(&self) -> &[OrcType] {
        &self.children
    }

    /// The i-th field name (structs only).
    pub fn field_name(&self, i: usize) -> &str {
        &self.field_names[i]
    }
}
