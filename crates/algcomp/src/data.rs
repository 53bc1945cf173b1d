//! Tabular datasets handed to algorithms.

use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Type of a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    Continuous,
    /// Category codes stored as whole numbers.
    Discrete,
}

/// Type of a whole dataset, or the kind of data an algorithm accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Continuous,
    Discrete,
    Mixed,
}

impl DataType {
    /// Whether an algorithm declaring `self` can run on data of type `data`.
    pub fn accepts(&self, data: DataType) -> bool {
        *self == DataType::Mixed || *self == data
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Continuous => "continuous",
            DataType::Discrete => "discrete",
            DataType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("{variables} variables but {columns} columns")]
    ColumnCount { variables: usize, columns: usize },

    #[error("column '{name}' has {found} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate variable '{0}'")]
    DuplicateVariable(String),
}

/// Column-major dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    variables: IndexMap<String, VariableType>,
    columns: Vec<Vec<f64>>,
    num_rows: usize,
}

impl DataSet {
    /// Build a dataset from `(name, type)` pairs and one column per variable.
    pub fn new(
        variables: Vec<(String, VariableType)>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, DataError> {
        if variables.len() != columns.len() {
            return Err(DataError::ColumnCount {
                variables: variables.len(),
                columns: columns.len(),
            });
        }

        let num_rows = columns.first().map_or(0, Vec::len);
        let mut map = IndexMap::with_capacity(variables.len());
        for ((name, var_type), column) in variables.into_iter().zip(&columns) {
            if column.len() != num_rows {
                return Err(DataError::RaggedColumn {
                    name,
                    expected: num_rows,
                    found: column.len(),
                });
            }
            if map.insert(name.clone(), var_type).is_some() {
                return Err(DataError::DuplicateVariable(name));
            }
        }

        Ok(Self {
            variables: map,
            columns,
            num_rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Variable names in column order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn variable_type(&self, name: &str) -> Option<VariableType> {
        self.variables.get(name).copied()
    }

    /// Whether `name` is a discrete variable of this dataset.
    pub fn is_discrete(&self, name: &str) -> bool {
        self.variable_type(name) == Some(VariableType::Discrete)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.variables
            .get_index_of(name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn column_at(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Overall type: mixed when both kinds of variable are present.
    pub fn data_type(&self) -> DataType {
        let discrete = self
            .variables
            .values()
            .filter(|t| **t == VariableType::Discrete)
            .count();
        if discrete == 0 {
            DataType::Continuous
        } else if discrete == self.variables.len() {
            DataType::Discrete
        } else {
            DataType::Mixed
        }
    }

    pub fn is_mixed(&self) -> bool {
        self.data_type() == DataType::Mixed
    }
}
