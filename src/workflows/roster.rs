//! CSV import of a shelter's pet roster into the pet store.
//!
//! Shelter management systems export the animal roster as CSV; this importer
//! hydrates the [`PetStore`] from such an export so applications can
//! reference real pets. Re-importing the same export is harmless: rows whose
//! id is already present are skipped.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::workflows::adoption::repository::{PetStore, RepositoryError};
use crate::workflows::adoption::{Pet, PetId};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Store(RepositoryError),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Store(err) => {
                write!(f, "could not persist imported pets: {}", err)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for RosterImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Store(err)
    }
}

pub struct PetRosterImporter;

impl PetRosterImporter {
    pub fn from_path<F: AsRef<Path>, S: PetStore>(
        path: F,
        store: &S,
    ) -> Result<usize, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, store)
    }

    /// Insert every well-formed roster row into the store, returning how many
    /// pets were added. Rows with a blank id and ids already present in the
    /// store are skipped.
    pub fn from_reader<R: Read, S: PetStore>(
        reader: R,
        store: &S,
    ) -> Result<usize, RosterImportError> {
        let mut imported = 0;

        for row in parse_rows(reader)? {
            let Some(id) = row.pet_id else {
                continue;
            };

            let pet_id = PetId(id);
            if store.fetch(&pet_id)?.is_some() {
                continue;
            }

            store.insert(Pet {
                id: pet_id,
                name: row.name,
                breed: row.breed.unwrap_or_default(),
                age: row.age,
                adoptable: row.adoptable.unwrap_or(true),
            })?;
            imported += 1;
        }

        Ok(imported)
    }
}

fn parse_rows<R: Read>(reader: R) -> Result<Vec<RosterRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<RosterRow>().collect()
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Pet ID", default, deserialize_with = "empty_string_as_none")]
    pet_id: Option<String>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Breed", default, deserialize_with = "empty_string_as_none")]
    breed: Option<String>,
    #[serde(rename = "Age", default, deserialize_with = "parse_optional_age")]
    age: Option<u8>,
    #[serde(
        rename = "Adoptable",
        default,
        deserialize_with = "parse_optional_flag"
    )]
    adoptable: Option<bool>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_optional_age<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|value| value.trim().parse::<u8>().ok()))
}

fn parse_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }))
}
