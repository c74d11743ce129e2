use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{de::DeserializeOwned, ser::SerializeStruct, Deserialize, Serialize};

use crate::{
    error::ArtifactError,
    vectorizer::term::{FrequencyVector, TermCounts},
};

/// Write a gzip compressed CBOR artifact
/// Parent directories are created as needed.
///
/// # Arguments
/// * `path` - destination file
/// * `value` - value to encode
pub fn write_artifact<T>(path: impl AsRef<Path>, value: &T) -> Result<(), ArtifactError>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_cbor::to_writer(&mut encoder, &value).map_err(|source| ArtifactError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = encoder.finish().map_err(io_err)?;
    writer.flush().map_err(io_err)
}

/// Read a gzip compressed CBOR artifact
///
/// # Arguments
/// * `path` - source file
///
/// # Returns
/// * `Err(ArtifactError::Io)` - missing or unreadable file, see [`ArtifactError::is_missing`]
/// * `Err(ArtifactError::Decode)` - not gzip, not CBOR, or the wrong shape
pub fn read_artifact<T>(path: impl AsRef<Path>) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = GzDecoder::new(BufReader::new(file));
    serde_cbor::from_reader(decoder).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// One term of a stored frequency vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub frequency: u64,
    pub document_occurrences: u64,
}

/// Stored form of a FrequencyVector
/// `FrequencyVector` serializes into this shape directly. Use
/// `into_frequency_vector` to decode and validate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrequencyVectorData {
    pub document_count: u64,
    pub words: Vec<WordFrequency>,
}

impl FrequencyVectorData {
    /// Convert into a FrequencyVector, checking its counters
    pub fn into_frequency_vector(self) -> Result<FrequencyVector, String> {
        FrequencyVector::from_parts(
            self.document_count,
            self.words.into_iter().map(|w| {
                (
                    w.word,
                    TermCounts {
                        frequency: w.frequency,
                        document_occurrence: w.document_occurrences,
                    },
                )
            }),
        )
    }
}

/// serialize helper for the word list
struct Words<'a>(&'a FrequencyVector);

#[derive(Serialize)]
struct WordFrequencyRef<'a> {
    word: &'a str,
    frequency: u64,
    document_occurrences: u64,
}

impl Serialize for Words<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|(word, counts)| WordFrequencyRef {
            word,
            frequency: counts.frequency,
            document_occurrences: counts.document_occurrence,
        }))
    }
}

impl Serialize for FrequencyVector {
    /// FrequencyVectorをシリアライズします
    /// memo は含まれません。
    /// デシリアライズするには`FrequencyVectorData`を使用してください。
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("FrequencyVector", 2)?;
        state.serialize_field("document_count", &self.document_count())?;
        state.serialize_field("words", &Words(self))?;
        state.end()
    }
}

/// Write a frequency vector artifact
pub fn write_frequency_vector(path: impl AsRef<Path>, vector: &FrequencyVector) -> Result<(), ArtifactError> {
    write_artifact(path, vector)
}

/// Read and validate a frequency vector artifact
pub fn read_frequency_vector(path: impl AsRef<Path>) -> Result<FrequencyVector, ArtifactError> {
    let path = path.as_ref();
    let data: FrequencyVectorData = read_artifact(path)?;
    data.into_frequency_vector().map_err(|reason| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::token::Tokenizer;

    #[test]
    fn frequency_vector_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/seed.vector");
        let tokenizer = Tokenizer::with_default_stopwords();
        let vector = FrequencyVector::from_texts(["satellite launch window", "satellite imagery"], &tokenizer);

        write_frequency_vector(&path, &vector).unwrap();
        let loaded = read_frequency_vector(&path).unwrap();
        assert_eq!(loaded, vector);
        let order: Vec<&str> = loaded.iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["satellite", "launch", "window", "imagery"]);
    }

    #[test]
    fn missing_artifact_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_frequency_vector(dir.path().join("nope.vector")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn garbage_artifact_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.vector");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        let err = read_frequency_vector(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Decode { .. }));
        assert!(!err.is_missing());
    }

    #[test]
    fn inconsistent_counts_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.vector");
        #[derive(Serialize)]
        struct Raw {
            document_count: u64,
            words: Vec<WordFrequency>,
        }
        let raw = Raw {
            document_count: 5,
            words: vec![WordFrequency {
                word: "robots".into(),
                frequency: 1,
                document_occurrences: 3,
            }],
        };
        write_artifact(&path, &raw).unwrap();
        let err = read_frequency_vector(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));
    }
}
