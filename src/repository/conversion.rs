use std::str::FromStr;

use thiserror::Error;

use crate::models::{types::EpochMillis, Difficulty, Platform};

pub trait DBConvertible: Sized {
    type DBType;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError>;

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DBFromConversionError {
    #[error("Failed to parse enum variant: {0}")]
    NoSuchVariant(String),
}

#[derive(Debug, Error)]
pub enum DBToConversionError {}

impl DBConvertible for EpochMillis {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.0)
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(EpochMillis(*value))
    }
}

impl DBConvertible for Platform {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Platform::from_str(value).map_err(|_| DBFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl DBConvertible for Difficulty {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Difficulty::from_str(value)
            .map_err(|_| DBFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl<T: DBConvertible> DBConvertible for Option<T> {
    type DBType = Option<T::DBType>;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        self.as_ref().map(T::to_db).transpose()
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        value.as_ref().map(T::from_db).transpose()
    }
}
