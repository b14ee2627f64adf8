use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeDomain {
    Point,
    Cell,
    Field,
}

impl AttributeDomain {
    pub const ALL: [AttributeDomain; 3] = [
        AttributeDomain::Point,
        AttributeDomain::Cell,
        AttributeDomain::Field,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Int,
    Vec3,
    SymTensor,
    Tensor,
}

impl AttributeType {
    pub fn components(self) -> usize {
        match self {
            AttributeType::Float | AttributeType::Int => 1,
            AttributeType::Vec3 => 3,
            AttributeType::SymTensor => 6,
            AttributeType::Tensor => 9,
        }
    }
}

/// Typed attribute column. `SymTensor` rows are packed as
/// `[XX, YY, ZZ, XY, YZ, XZ]`, `Tensor` rows are row-major 3x3.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeStorage {
    Float(Vec<f64>),
    Int(Vec<i32>),
    Vec3(Vec<[f64; 3]>),
    SymTensor(Vec<[f64; 6]>),
    Tensor(Vec<[f64; 9]>),
}

impl AttributeStorage {
    pub fn len(&self) -> usize {
        match self {
            AttributeStorage::Float(values) => values.len(),
            AttributeStorage::Int(values) => values.len(),
            AttributeStorage::Vec3(values) => values.len(),
            AttributeStorage::SymTensor(values) => values.len(),
            AttributeStorage::Tensor(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> AttributeType {
        match self {
            AttributeStorage::Float(_) => AttributeType::Float,
            AttributeStorage::Int(_) => AttributeType::Int,
            AttributeStorage::Vec3(_) => AttributeType::Vec3,
            AttributeStorage::SymTensor(_) => AttributeType::SymTensor,
            AttributeStorage::Tensor(_) => AttributeType::Tensor,
        }
    }

    pub fn as_ref(&self) -> AttributeRef<'_> {
        match self {
            AttributeStorage::Float(values) => AttributeRef::Float(values.as_slice()),
            AttributeStorage::Int(values) => AttributeRef::Int(values.as_slice()),
            AttributeStorage::Vec3(values) => AttributeRef::Vec3(values.as_slice()),
            AttributeStorage::SymTensor(values) => AttributeRef::SymTensor(values.as_slice()),
            AttributeStorage::Tensor(values) => AttributeRef::Tensor(values.as_slice()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    InvalidDomain,
    Missing(String),
    InvalidLength {
        expected: usize,
        actual: usize,
    },
    InvalidType {
        expected: AttributeType,
        actual: AttributeType,
    },
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeError::InvalidDomain => write!(f, "attribute not allowed on this domain"),
            AttributeError::Missing(name) => write!(f, "attribute '{}' not found", name),
            AttributeError::InvalidLength { expected, actual } => {
                write!(f, "attribute length {} does not match domain length {}", actual, expected)
            }
            AttributeError::InvalidType { expected, actual } => {
                write!(f, "attribute type {:?} where {:?} was expected", actual, expected)
            }
        }
    }
}

impl std::error::Error for AttributeError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub name: String,
    pub domain: AttributeDomain,
    pub data_type: AttributeType,
    pub len: usize,
    pub implicit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeRef<'a> {
    Float(&'a [f64]),
    Int(&'a [i32]),
    Vec3(&'a [[f64; 3]]),
    SymTensor(&'a [[f64; 6]]),
    Tensor(&'a [[f64; 9]]),
}

impl<'a> AttributeRef<'a> {
    pub fn len(&self) -> usize {
        match self {
            AttributeRef::Float(values) => values.len(),
            AttributeRef::Int(values) => values.len(),
            AttributeRef::Vec3(values) => values.len(),
            AttributeRef::SymTensor(values) => values.len(),
            AttributeRef::Tensor(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> AttributeType {
        match self {
            AttributeRef::Float(_) => AttributeType::Float,
            AttributeRef::Int(_) => AttributeType::Int,
            AttributeRef::Vec3(_) => AttributeType::Vec3,
            AttributeRef::SymTensor(_) => AttributeType::SymTensor,
            AttributeRef::Tensor(_) => AttributeType::Tensor,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridAttributes {
    point: HashMap<String, AttributeStorage>,
    cell: HashMap<String, AttributeStorage>,
    field: HashMap<String, AttributeStorage>,
}

impl GridAttributes {
    pub fn map(&self, domain: AttributeDomain) -> &HashMap<String, AttributeStorage> {
        match domain {
            AttributeDomain::Point => &self.point,
            AttributeDomain::Cell => &self.cell,
            AttributeDomain::Field => &self.field,
        }
    }

    pub fn map_mut(&mut self, domain: AttributeDomain) -> &mut HashMap<String, AttributeStorage> {
        match domain {
            AttributeDomain::Point => &mut self.point,
            AttributeDomain::Cell => &mut self.cell,
            AttributeDomain::Field => &mut self.field,
        }
    }

    pub fn get(&self, domain: AttributeDomain, name: &str) -> Option<&AttributeStorage> {
        self.map(domain).get(name)
    }

    pub fn insert(&mut self, domain: AttributeDomain, name: String, storage: AttributeStorage) {
        self.map_mut(domain).insert(name, storage);
    }

    pub fn remove(&mut self, domain: AttributeDomain, name: &str) -> Option<AttributeStorage> {
        self.map_mut(domain).remove(name)
    }

    pub fn list(&self) -> Vec<AttributeInfo> {
        let mut list = Vec::new();
        for domain in AttributeDomain::ALL {
            for (name, storage) in self.map(domain) {
                list.push(AttributeInfo {
                    name: name.clone(),
                    domain,
                    data_type: storage.data_type(),
                    len: storage.len(),
                    implicit: false,
                });
            }
        }
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}
