//! Field and method descriptors
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-4.html#jvms-4.3>

use super::{BinaryName, Name};
use std::fmt;
use thiserror::Error;

/// Descriptor text that could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),

    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("malformed class name at offset {offset}: {message}")]
    ClassName { offset: usize, message: String },
}

/// Position in some descriptor text being parsed
pub struct DescriptorReader<'s> {
    source: &'s str,
    offset: usize,
}

impl<'s> DescriptorReader<'s> {
    pub fn new(source: &'s str) -> DescriptorReader<'s> {
        DescriptorReader { source, offset: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    /// Consume the next character
    fn bump(&mut self) -> Result<char, DescriptorError> {
        let c = self
            .peek()
            .ok_or(DescriptorError::UnexpectedEnd(self.offset))?;
        self.offset += c.len_utf8();
        Ok(c)
    }

    /// Consume the next character, which must be `expected`
    fn expect(&mut self, expected: char) -> Result<(), DescriptorError> {
        let offset = self.offset;
        match self.bump()? {
            c if c == expected => Ok(()),
            found => Err(DescriptorError::Unexpected { found, offset }),
        }
    }

    fn unexpected(&self) -> DescriptorError {
        match self.peek() {
            Some(found) => DescriptorError::Unexpected {
                found,
                offset: self.offset,
            },
            None => DescriptorError::UnexpectedEnd(self.offset),
        }
    }
}

pub trait ParseDescriptor: Sized {
    /// Parse a descriptor that spans the whole string
    fn parse(source: &str) -> Result<Self, DescriptorError> {
        let mut reader = DescriptorReader::new(source);
        let parsed = Self::read(&mut reader)?;
        match reader.peek() {
            None => Ok(parsed),
            Some(_) => Err(reader.unexpected()),
        }
    }

    /// Parse a descriptor at the reader's position, leaving the reader just after it
    fn read(reader: &mut DescriptorReader<'_>) -> Result<Self, DescriptorError>;
}

pub trait RenderDescriptor {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    fn render(&self) -> String {
        let mut rendered = String::new();
        // Writes into a `String` never fail
        let _ = self.write_descriptor(&mut rendered);
        rendered
    }
}

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_char(c: char) -> Option<BaseType> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    /// Longs and doubles take up two local variable slots
    pub fn is_wide(self) -> bool {
        matches!(self, BaseType::Long | BaseType::Double)
    }
}

impl RenderDescriptor for BaseType {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_char(self.as_char())
    }
}

impl ParseDescriptor for BaseType {
    fn read(reader: &mut DescriptorReader<'_>) -> Result<Self, DescriptorError> {
        let base_type = reader.peek().and_then(BaseType::from_char);
        match base_type {
            Some(base_type) => {
                reader.bump()?;
                Ok(base_type)
            }
            None => Err(reader.unexpected()),
        }
    }
}

/// Class names appear in descriptors as `L<name>;`
impl RenderDescriptor for BinaryName {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "L{};", self.as_str())
    }
}

impl ParseDescriptor for BinaryName {
    fn read(reader: &mut DescriptorReader<'_>) -> Result<Self, DescriptorError> {
        reader.expect('L')?;
        let start = reader.offset;
        let length = reader.source[start..]
            .find(';')
            .ok_or(DescriptorError::UnexpectedEnd(reader.source.len()))?;
        reader.offset += length + 1;

        let name = &reader.source[start..start + length];
        BinaryName::from_string(name.to_owned()).map_err(|message| DescriptorError::ClassName {
            offset: start,
            message,
        })
    }
}

/// Reference type
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RefType<Class> {
    Object(Class),
    ObjectArray(ArrayType<Class>),
    PrimitiveArray(ArrayType<BaseType>),
}

/// Array type, flattened down to its innermost element
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArrayType<T> {
    /// Dimensions beyond the first (`A[]` has 0, `A[][][][]` has 3)
    pub additional_dimensions: usize,

    /// Innermost element type (`A` for `A[][]`)
    pub element_type: T,
}

impl<T> ArrayType<T> {
    fn outermost(element_type: T) -> ArrayType<T> {
        ArrayType {
            additional_dimensions: 0,
            element_type,
        }
    }

    pub const fn dimensions(&self) -> usize {
        self.additional_dimensions + 1
    }

    fn nested(self) -> ArrayType<T> {
        ArrayType {
            additional_dimensions: self.additional_dimensions + 1,
            element_type: self.element_type,
        }
    }
}

impl<T: RenderDescriptor> RenderDescriptor for ArrayType<T> {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        for _ in 0..self.dimensions() {
            out.write_char('[')?;
        }
        self.element_type.write_descriptor(out)
    }
}

impl<C> RefType<C> {
    /// Class mentioned by the type (the element class for arrays of objects)
    pub fn class(&self) -> Option<&C> {
        match self {
            RefType::Object(class) => Some(class),
            RefType::ObjectArray(array) => Some(&array.element_type),
            RefType::PrimitiveArray(_) => None,
        }
    }

    /// Array whose elements have the given type
    pub fn array(element: FieldType<C>) -> RefType<C> {
        match element {
            FieldType::Base(base_type) => RefType::PrimitiveArray(ArrayType::outermost(base_type)),
            FieldType::Ref(RefType::Object(class)) => {
                RefType::ObjectArray(ArrayType::outermost(class))
            }
            FieldType::Ref(RefType::PrimitiveArray(array)) => {
                RefType::PrimitiveArray(array.nested())
            }
            FieldType::Ref(RefType::ObjectArray(array)) => RefType::ObjectArray(array.nested()),
        }
    }
}

impl<C: RenderDescriptor> RenderDescriptor for RefType<C> {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            RefType::Object(class) => class.write_descriptor(out),
            RefType::ObjectArray(array) => array.write_descriptor(out),
            RefType::PrimitiveArray(array) => array.write_descriptor(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for RefType<C> {
    fn read(reader: &mut DescriptorReader<'_>) -> Result<Self, DescriptorError> {
        if reader.peek() != Some('[') {
            return C::read(reader).map(RefType::Object);
        }

        let mut dimensions = 0;
        while reader.peek() == Some('[') {
            reader.bump()?;
            dimensions += 1;
        }
        let additional_dimensions = dimensions - 1;
        if reader.peek() == Some('L') {
            Ok(RefType::ObjectArray(ArrayType {
                additional_dimensions,
                element_type: C::read(reader)?,
            }))
        } else {
            Ok(RefType::PrimitiveArray(ArrayType {
                additional_dimensions,
                element_type: BaseType::read(reader)?,
            }))
        }
    }
}

/// Type of a field, local variable, or stack value
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType<Class> {
    Base(BaseType),
    Ref(RefType<Class>),
}

impl<C> FieldType<C> {
    pub fn array(element: FieldType<C>) -> FieldType<C> {
        FieldType::Ref(RefType::array(element))
    }

    pub const fn object(class: C) -> FieldType<C> {
        FieldType::Ref(RefType::Object(class))
    }

    pub const fn int() -> FieldType<C> {
        FieldType::Base(BaseType::Int)
    }

    pub const fn long() -> FieldType<C> {
        FieldType::Base(BaseType::Long)
    }

    /// Local variable slots taken up by a value of this type
    pub fn slots(&self) -> usize {
        match self {
            FieldType::Base(base_type) if base_type.is_wide() => 2,
            _ => 1,
        }
    }

    /// Class mentioned by the type, if any
    pub fn class(&self) -> Option<&C> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Ref(ref_type) => ref_type.class(),
        }
    }
}

impl<C: RenderDescriptor> RenderDescriptor for FieldType<C> {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            FieldType::Base(base_type) => base_type.write_descriptor(out),
            FieldType::Ref(ref_type) => ref_type.write_descriptor(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for FieldType<C> {
    fn read(reader: &mut DescriptorReader<'_>) -> Result<Self, DescriptorError> {
        match reader.peek() {
            Some('L' | '[') => RefType::read(reader).map(FieldType::Ref),
            _ => BaseType::read(reader).map(FieldType::Base),
        }
    }
}

/// Signature of a method
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct MethodDescriptor<Class> {
    pub parameters: Vec<FieldType<Class>>,

    /// `None` for `void`
    pub return_type: Option<FieldType<Class>>,
}

impl<C> MethodDescriptor<C> {
    /// Local variable slots taken up by the arguments (including the receiver, if any)
    pub fn argument_slots(&self, has_receiver: bool) -> usize {
        let receiver = usize::from(has_receiver);
        receiver + self.parameters.iter().map(FieldType::slots).sum::<usize>()
    }
}

impl<C: RenderDescriptor> RenderDescriptor for MethodDescriptor<C> {
    fn write_descriptor(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_char('(')?;
        for parameter in &self.parameters {
            parameter.write_descriptor(out)?;
        }
        out.write_char(')')?;
        match &self.return_type {
            None => out.write_char('V'),
            Some(return_type) => return_type.write_descriptor(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for MethodDescriptor<C> {
    fn read(reader: &mut DescriptorReader<'_>) -> Result<Self, DescriptorError> {
        reader.expect('(')?;
        let mut parameters = vec![];
        loop {
            match reader.peek() {
                Some(')') => break,
                None => return Err(reader.unexpected()),
                Some(_) => parameters.push(FieldType::read(reader)?),
            }
        }
        reader.expect(')')?;

        let return_type = if reader.peek() == Some('V') {
            reader.bump()?;
            None
        } else {
            Some(FieldType::read(reader)?)
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}
