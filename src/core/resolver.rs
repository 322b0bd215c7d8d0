//! Tagger identification from the column schema of a sample.
//!
//! A tagger writes one probability column per flavour, named
//! `<tagger><suffix>`. Stripping every known suffix from every column gives
//! (suffix, prefix) pairs; a prefix is a candidate when it appears with every
//! required suffix. Exactly one candidate is accepted, anything else fails.

use crate::adapters::sample::SampleReader;
use crate::domain::flavours::Flavour;
use crate::domain::model::TaggerIdentity;
use crate::utils::error::{PlotError, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Prefixes `P` such that `P + suffix` is one of `columns`. Empty prefixes are ignored.
fn prefixes_for_suffix<'a>(columns: &'a [String], suffix: &str) -> BTreeSet<&'a str> {
    columns
        .iter()
        .filter_map(|column| column.strip_suffix(suffix))
        .filter(|prefix| !prefix.is_empty())
        .collect()
}

/// Tagger names whose probability columns cover every flavour in `flavours`.
pub fn candidate_taggers(columns: &[String], flavours: &[Flavour]) -> Vec<String> {
    let mut sets = flavours
        .iter()
        .map(|flavour| prefixes_for_suffix(columns, &flavour.prob_suffix));

    let Some(first) = sets.next() else {
        return Vec::new();
    };
    sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Resolves the tagger of a schema. An explicit name is passed through unchecked.
pub fn identify(
    explicit: Option<&str>,
    source_name: &str,
    columns: &[String],
    flavours: &[Flavour],
) -> Result<TaggerIdentity> {
    if let Some(name) = explicit {
        return Ok(TaggerIdentity::new(name));
    }

    let candidates = candidate_taggers(columns, flavours);
    match candidates.as_slice() {
        [single] => {
            tracing::debug!("Identified tagger '{}' in {}", single, source_name);
            Ok(TaggerIdentity::new(single.clone()))
        }
        _ => Err(PlotError::AmbiguousOrMissingTagger {
            source_name: source_name.to_string(),
            flavours: flavours.iter().map(|f| f.name.clone()).collect(),
            candidates,
        }),
    }
}

/// [`identify`] on the header of a sample file.
pub fn identify_file(
    explicit: Option<&str>,
    path: &Path,
    flavours: &[Flavour],
) -> Result<TaggerIdentity> {
    if let Some(name) = explicit {
        return Ok(TaggerIdentity::new(name));
    }
    let reader = SampleReader::open(path)?;
    identify(None, &path.display().to_string(), reader.columns(), flavours)
}
