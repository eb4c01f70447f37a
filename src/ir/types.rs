/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fmt;

// IR-level types. `Array` dims are the declared extents; an array
// parameter carries a size-erased leading dim of 0 and is stored as a
// base address rather than in-frame storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Void,
    Int32,
    Bool,
    Pointer(Box<Type>),
    Array { elem: Box<Type>, dims: Vec<i32> },
}

impl Type {
    pub fn int_array(dims: Vec<i32>) -> Type {
        Type::Array {
            elem: Box::new(Type::Int32),
            dims,
        }
    }

    pub fn pointer_to(elem: Type) -> Type {
        Type::Pointer(Box::new(elem))
    }

    // Size in bytes. A size-erased array (leading dim 0) is held as a
    // pointer-sized base address.
    pub fn size(&self) -> i32 {
        match self {
            Type::Void => 0,
            Type::Int32 => 4,
            Type::Bool => 1,
            Type::Pointer(_) => 4,
            Type::Array { elem, dims } => {
                if dims.first() == Some(&0) {
                    4
                } else {
                    dims.iter().product::<i32>() * elem.size()
                }
            }
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    // Declared dims of an array type, empty for anything else.
    pub fn dims(&self) -> &[i32] {
        match self {
            Type::Array { dims, .. } => dims,
            _ => &[],
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int32 => write!(f, "i32"),
            Type::Bool => write!(f, "i1"),
            Type::Pointer(elem) => write!(f, "{}*", elem),
            Type::Array { elem, dims } => {
                write!(f, "{}", elem)?;
                for d in dims {
                    write!(f, "[{}]", d)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(Type::Void.size(), 0);
        assert_eq!(Type::Int32.size(), 4);
        assert_eq!(Type::Bool.size(), 1);
        assert_eq!(Type::pointer_to(Type::Int32).size(), 4);
    }

    #[test]
    fn test_array_size_is_product_of_dims() {
        assert_eq!(Type::int_array(vec![10]).size(), 40);
        assert_eq!(Type::int_array(vec![3, 4]).size(), 48);
        assert_eq!(Type::int_array(vec![2, 3, 4]).size(), 96);
    }

    #[test]
    fn test_size_erased_array_is_pointer_sized() {
        assert_eq!(Type::int_array(vec![0, 4]).size(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Int32.to_string(), "i32");
        assert_eq!(Type::Bool.to_string(), "i1");
        assert_eq!(Type::pointer_to(Type::Int32).to_string(), "i32*");
        assert_eq!(Type::int_array(vec![3, 4]).to_string(), "i32[3][4]");
    }
}
