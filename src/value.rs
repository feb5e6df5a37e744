use crate::ast::{write_list, Block, Identifier};
use crate::environment::SharedEnv;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    String(String),
    Function(Rc<Function>),
}

/// A user-defined function closed over the scope it was declared in.
pub struct Function {
    pub name: String,
    pub parameters: Vec<Identifier>,
    pub body: Rc<Block>,
    pub env: SharedEnv,
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Integer(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            Value::Function(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    pub(crate) fn from_bool(b: bool) -> Value {
        Value::Integer(b as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Function(function) => write!(f, "{}", function),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "meow(")?;
        write_list(f, &self.parameters)?;
        write!(f, ") {}", self.body)
    }
}

impl fmt::Debug for Function {
    // The captured scope usually contains this function again.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    /// Functions are equal only when they are the same closure.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
