//! Parser for the compact ORC type-string syntax.
//!
//! The grammar is the one Hive prints for table schemas:
//!
//! ```text
//! type       := primitive | decimal | char | varchar | list | map | struct | union
//! primitive  := "boolean" | "tinyint" | "smallint" | "int" | "bigint"
//!             | "float" | "double" | "string" | "binary" | "date"
//!             | "timestamp" | "timestamp with local time zone"
//! decimal    := "decimal" "(" int "," int ")"
//! char       := "char" "(" int ")"
//! varchar    := "varchar" "(" int ")"
//! list       := "array" "<" type ">"
//! map        := "map" "<" type "," type ">"
//! struct     := "struct" "<" name ":" type ("," name ":" type)* ">"
//! union      := "uniontype" "<" type ("," type)* ">"
//! ```

use crate::error::{Result, SchemaError};
use crate::schema::{OrcType, TypeKind};

/// Parse a type string into an [`OrcType`] tree with column ids assigned.
///
/// # Examples
/// ```
/// use freighter::schema::{parse_type, TypeKind};
///
/// let ty = parse_type("struct<a:int,b:array<string>>").unwrap();
/// assert_eq!(ty.kind(), TypeKind::Struct);
/// assert_eq!(ty.subtype(1).subtype(0).column_id(), 3);
/// ```
pub fn parse_type(input: &str) -> Result<OrcType> {
    let mut parser = TypeParser::new(input);
    let ty = parser.parse()?;
    parser.expect_end()?;
    Ok(ty.with_ids())
}

struct TypeParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        TypeParser { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.position = self.input.len() - trimmed.len();
    }

    fn consume(&mut self, token: char) -> Result<()> {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.position += token.len_utf8();
            Ok(())
        } else {
            Err(SchemaError::InvalidType(format!(
                "expected '{}' at offset {} in '{}'",
                token, self.position, self.input
            ))
            .into())
        }
    }

    /// Read an identifier: letters, digits, underscores.
    fn identifier(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(SchemaError::InvalidType(format!(
                "expected identifier at offset {} in '{}'",
                self.position, self.input
            ))
            .into());
        }
        self.position += end;
        Ok(&rest[..end])
    }

    fn integer(&mut self) -> Result<u64> {
        let word = self.identifier()?;
        word.parse::<u64>().map_err(|_| {
            SchemaError::InvalidType(format!("expected integer, found '{}'", word)).into()
        })
    }

    fn expect_end(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.position == self.input.len() {
            Ok(())
        } else {
            Err(SchemaError::InvalidType(format!(
                "trailing characters at offset {} in '{}'",
                self.position, self.input
            ))
            .into())
        }
    }

    fn parse(&mut self) -> Result<OrcType> {
        let name = self.identifier()?;
        match name {
            "boolean" => Ok(OrcType::primitive(TypeKind::Boolean)),
            "tinyint" => Ok(OrcType::primitive(TypeKind::Byte)),
            "smallint" => Ok(OrcType::primitive(TypeKind::Short)),
            "int" => Ok(OrcType::primitive(TypeKind::Int)),
            "bigint" => Ok(OrcType::primitive(TypeKind::Long)),
            "float" => Ok(OrcType::primitive(TypeKind::Float)),
            "double" => Ok(OrcType::primitive(TypeKind::Double)),
            "string" => Ok(OrcType::primitive(TypeKind::String)),
            "binary" => Ok(OrcType::primitive(TypeKind::Binary)),
            "date" => Ok(OrcType::primitive(TypeKind::Date)),
            "timestamp" => self.parse_timestamp(),
            "decimal" => {
                self.consume('(')?;
                let precision = self.integer()?;
                self.consume(',')?;
                let scale = self.integer()?;
                self.consume(')')?;
                Ok(OrcType::decimal(precision as u32, scale as u32))
            }
            "char" => {
                self.consume('(')?;
                let length = self.integer()?;
                self.consume(')')?;
                Ok(OrcType::char(length))
            }
            "varchar" => {
                self.consume('(')?;
                let length = self.integer()?;
                self.consume(')')?;
                Ok(OrcType::varchar(length))
            }
            "array" => {
                self.consume('<')?;
                let element = self.parse()?;
                self.consume('>')?;
                Ok(OrcType::list_of(element))
            }
            "map" => {
                self.consume('<')?;
                let key = self.parse()?;
                self.consume(',')?;
                let value = self.parse()?;
                self.consume('>')?;
                Ok(OrcType::map_of(key, value))
            }
            "struct" => {
                self.consume('<')?;
                let mut fields = Vec::new();
                loop {
                    let field = self.identifier()?.to_string();
                    self.consume(':')?;
                    let child = self.parse()?;
                    fields.push((field, child));
                    self.skip_whitespace();
                    if self.rest().starts_with(',') {
                        self.consume(',')?;
                    } else {
                        break;
                    }
                }
                self.consume('>')?;
                Ok(build_struct(fields))
            }
            "uniontype" => {
                self.consume('<')?;
                let mut children = vec![self.parse()?];
                loop {
                    self.skip_whitespace();
                    if self.rest().starts_with(',') {
                        self.consume(',')?;
                        children.push(self.parse()?);
                    } else {
                        break;
                    }
                }
                self.consume('>')?;
                Ok(OrcType::union_of(children))
            }
            other => Err(SchemaError::UnknownType(other.to_string()).into()),
        }
    }

    /// "timestamp" optionally followed by "with local time zone".
    fn parse_timestamp(&mut self) -> Result<OrcType> {
        let checkpoint = self.position;
        self.skip_whitespace();
        if self.rest().starts_with("with") {
            for word in ["with", "local", "time", "zone"] {
                let got = self.identifier()?;
                if got != word {
                    return Err(SchemaError::InvalidType(format!(
                        "expected '{}' in timestamp qualifier, found '{}'",
                        word, got
                    ))
                    .into());
                }
            }
            Ok(OrcType::primitive(TypeKind::TimestampInstant))
        } else {
            self.position = checkpoint;
            Ok(OrcType::primitive(TypeKind::Timestamp))
        }
    }
}

fn build_struct(fields: Vec<(String, OrcType)>) -> OrcType {
    OrcType::struct_of(fields.iter().map(|(n, c)| (n.as_str(), c.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        for (text, kind) in [
            ("boolean", TypeKind::Boolean),
            ("tinyint", TypeKind::Byte),
            ("smallint", TypeKind::Short),
            ("int", TypeKind::Int),
            ("bigint", TypeKind::Long),
            ("float", TypeKind::Float),
            ("double", TypeKind::Double),
            ("string", TypeKind::String),
            ("binary", TypeKind::Binary),
            ("date", TypeKind::Date),
            ("timestamp", TypeKind::Timestamp),
        ] {
            let ty = parse_type(text).unwrap();
            assert_eq!(ty.kind(), kind, "parsing '{}'", text);
            assert_eq!(ty.column_id(), 0);
        }
    }

    #[test]
    fn test_parse_timestamp_instant() {
        let ty = parse_type("timestamp with local time zone").unwrap();
        assert_eq!(ty.kind(), TypeKind::TimestampInstant);
    }

    #[test]
    fn test_parse_decimal() {
        let ty = parse_type("decimal(18,6)").unwrap();
        assert_eq!(ty.kind(), TypeKind::Decimal);
        assert_eq!(ty.precision(), 18);
        assert_eq!(ty.scale(), 6);
    }

    #[test]
    fn test_parse_char_varchar() {
        let ty = parse_type("char(3)").unwrap();
        assert_eq!(ty.kind(), TypeKind::Char);
        assert_eq!(ty.maximum_length(), 3);

        let ty = parse_type("varchar(255)").unwrap();
        assert_eq!(ty.kind(), TypeKind::Varchar);
        assert_eq!(ty.maximum_length(), 255);
    }

    #[test]
    fn test_parse_nested() {
        let ty = parse_type("struct<a:int,b:map<string,array<double>>,c:uniontype<int,string>>")
            .unwrap();
        assert_eq!(ty.kind(), TypeKind::Struct);
        assert_eq!(ty.subtype_count(), 3);
        assert_eq!(ty.field_name(0), "a");
        assert_eq!(ty.field_name(1), "b");

        let map = ty.subtype(1);
        assert_eq!(map.kind(), TypeKind::Map);
        assert_eq!(map.subtype(0).kind(), TypeKind::String);
        assert_eq!(map.subtype(1).kind(), TypeKind::List);
        assert_eq!(map.subtype(1).subtype(0).kind(), TypeKind::Double);

        let union = ty.subtype(2);
        assert_eq!(union.kind(), TypeKind::Union);
        assert_eq!(union.subtype_count(), 2);

        // pre-order ids: struct=0, a=1, map=2, key=3, list=4, double=5,
        // union=6, int=7, string=8
        assert_eq!(map.subtype(1).subtype(0).column_id(), 5);
        assert_eq!(union.subtype(1).column_id(), 8);
    }

    #[test]
    fn test_parse_whitespace() {
        let ty = parse_type("struct< a : int , b : string >").unwrap();
        assert_eq!(ty.subtype_count(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_type("").is_err());
        assert!(parse_type("integer").is_err());
        assert!(parse_type("decimal(10)").is_err());
        assert!(parse_type("array<int").is_err());
        assert!(parse_type("int,").is_err());
        assert!(parse_type("struct<:int>").is_err());
    }
}
