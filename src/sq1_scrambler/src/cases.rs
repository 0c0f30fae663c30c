//! Named PBL cases and random case generation.
//!
//! A PBL case name is `top/bottom`, taking the top layer of the first named
//! case and the bottom layer of the second. Each generated state also gets a
//! random adjustment of both faces, a random quarter turn rotation of both
//! layer strings and an equator chosen by the [`MiddleLayerMode`].

use crate::puzzle::{PuzzleState, StateParseError};
use itertools::Itertools;
use log::trace;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PblCase {
    pub name: &'static str,
    pub top: &'static str,
    pub bottom: &'static str,
}

const fn pbl(name: &'static str, top: &'static str, bottom: &'static str) -> PblCase {
    PblCase { name, top, bottom }
}

pub const NON_PARITY_CASES: [PblCase; 22] = [
    pbl("-", "011233455677", "998bbaddcffe"),
    pbl("Al", "211455633077", "99edd8bbaffc"),
    pbl("Ar", "611055233477", "99addcbbeff8"),
    pbl("E", "033211477655", "bb899affcdde"),
    pbl("F", "011655433277", "99cddabb8ffe"),
    pbl("Gal", "611455033277", "99cddebbaff8"),
    pbl("Gar", "211655033477", "99addebb8ffc"),
    pbl("Gol", "411055633277", "99cdd8bbeffa"),
    pbl("Gor", "411655233077", "99eddcbb8ffa"),
    pbl("H", "411633055277", "99cbbedd8ffa"),
    pbl("Ja", "011455233677", "998ddcbbaffe"),
    pbl("Jm", "011255633477", "99add8bbcffe"),
    pbl("Na", "455233011677", "998ffeddcbba"),
    pbl("Nm", "411277055633", "dd8bbe99cffa"),
    pbl("Rl", "611255433077", "99eddabbcff8"),
    pbl("Rr", "211055433677", "998ddabbeffc"),
    pbl("T", "411255033677", "998ddebbcffa"),
    pbl("Ul", "611233055477", "99abbeddcff8"),
    pbl("Ur", "411233655077", "99ebb8ddcffa"),
    pbl("V", "655233411077", "99effaddcbb8"),
    pbl("Y", "255033411677", "998ffaddebbc"),
    pbl("Z", "211033655477", "99abb8ddeffc"),
];

pub const PARITY_CASES: [PblCase; 22] = [
    pbl("Adj", "011233655477", "99abb8ddcffe"),
    pbl("Opp", "411233055677", "998bbeddcffa"),
    pbl("pJ", "011255433677", "998ddabbcffe"),
    pbl("pN", "055233411677", "998ffaddcbbe"),
    pbl("Ba", "211455033677", "998ddebbaffc"),
    pbl("Bm", "611255033477", "99addebbcff8"),
    pbl("Cl", "611055433277", "99cddabbeff8"),
    pbl("Cr", "211655433077", "99eddabb8ffc"),
    pbl("Da", "411055233677", "998ddcbbeffa"),
    pbl("Dm", "411255633077", "99edd8bbcffa"),
    pbl("Ka", "611455233077", "99eddcbbaff8"),
    pbl("Km", "211055633477", "99add8bbeffc"),
    pbl("M", "411655033277", "99cddebb8ffa"),
    pbl("Ol", "611033255477", "99abbcddeff8"),
    pbl("Or", "211433655077", "99ebb8ddaffc"),
    pbl("Pl", "011455633277", "99cdd8bbaffe"),
    pbl("Pr", "011655233477", "99addcbb8ffe"),
    pbl("Q", "255033611477", "99aff8ddebbc"),
    pbl("Sa", "211677455033", "ddebba998ffc"),
    pbl("Sm", "655033411277", "99cffaddebb8"),
    pbl("W", "211633055477", "99abbedd8ffc"),
    pbl("X", "655433211077", "99effcddabb8"),
];

/// Layer rotations applied to the case strings, in slots.
const LAYER_ROTATIONS: [isize; 4] = [0, 3, 6, -3];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseFamily {
    NonParity,
    Parity,
}

impl CaseFamily {
    fn cases(self) -> &'static [PblCase] {
        match self {
            CaseFamily::NonParity => &NON_PARITY_CASES,
            CaseFamily::Parity => &PARITY_CASES,
        }
    }
}

/// Look up a single layer case by name.
#[must_use]
pub fn find_case(name: &str) -> Option<(CaseFamily, &'static PblCase)> {
    [CaseFamily::NonParity, CaseFamily::Parity]
        .into_iter()
        .find_map(|family| {
            family
                .cases()
                .iter()
                .find(|case| case.name == name)
                .map(|case| (family, case))
        })
}

/// Every valid `top/bottom` case name of a family.
pub fn case_names(family: CaseFamily) -> impl Iterator<Item = String> {
    family
        .cases()
        .iter()
        .cartesian_product(family.cases())
        .map(|(top, bottom)| format!("{}/{}", top.name, bottom.name))
}

/// How the equator of a generated case is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MiddleLayerMode {
    /// `+`: the equator is always swapped.
    Swapped,
    /// `-`: the equator is never swapped.
    Unswapped,
    #[default]
    Random,
}

impl From<&str> for MiddleLayerMode {
    /// `+` and `-` pick a fixed equator; anything else is random.
    fn from(ml_mode: &str) -> Self {
        match ml_mode {
            "+" => MiddleLayerMode::Swapped,
            "-" => MiddleLayerMode::Unswapped,
            _ => MiddleLayerMode::Random,
        }
    }
}

impl fmt::Display for MiddleLayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MiddleLayerMode::Swapped => "+",
            MiddleLayerMode::Unswapped => "-",
            MiddleLayerMode::Random => "random",
        })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaseError {
    #[error("Case name {0:?} is not of the form `top/bottom`")]
    MalformedName(String),
    #[error("Unknown case {0:?}")]
    UnknownCase(String),
    #[error("Cases {top:?} and {bottom:?} are not both parity or both non-parity cases")]
    MixedParity { top: String, bottom: String },
    #[error("Case {name:?} has a malformed state: {source}")]
    InvalidState {
        name: String,
        source: StateParseError,
    },
}

fn hex_labels(layer: &str) -> Vec<u8> {
    layer
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|digit| u8::try_from(digit).unwrap_or_default())
        .collect()
}

/// Relabel the pieces as if the top face was turned by `top_shift` and the
/// bottom face by `bottom_shift` quarter turns before the case was set up.
fn adjust_faces(labels: &mut [u8], top_shift: u8, bottom_shift: u8) {
    for label in labels {
        *label = if *label < 8 {
            (*label + top_shift * 2) % 8
        } else {
            8 + (*label - 8 + bottom_shift * 2) % 8
        };
    }
}

fn rotate_layer(labels: &mut [u8], slots: isize) {
    let len = isize::try_from(labels.len()).unwrap_or(isize::MAX);
    // Always in 0..len, so the conversion cannot fail
    let slots = usize::try_from(slots.rem_euclid(len)).unwrap_or_default();
    labels.rotate_left(slots);
}

fn hex_string(labels: &[u8]) -> String {
    labels.iter().map(|label| format!("{label:x}")).collect()
}

/// Generate a random state of the `top/bottom` PBL case `case_name`.
///
/// # Errors
///
/// Fails if the case name is malformed, unknown, or mixes parity and
/// non-parity cases.
pub fn generate_case_state(
    rng: &mut fastrand::Rng,
    case_name: &str,
    middle_layer_mode: MiddleLayerMode,
) -> Result<PuzzleState, CaseError> {
    let Some((top_name, bottom_name)) = case_name.split_once('/') else {
        return Err(CaseError::MalformedName(case_name.to_owned()));
    };
    if bottom_name.contains('/') {
        return Err(CaseError::MalformedName(case_name.to_owned()));
    }
    let (top_family, top_case) =
        find_case(top_name).ok_or_else(|| CaseError::UnknownCase(top_name.to_owned()))?;
    let (bottom_family, bottom_case) =
        find_case(bottom_name).ok_or_else(|| CaseError::UnknownCase(bottom_name.to_owned()))?;
    if top_family != bottom_family {
        return Err(CaseError::MixedParity {
            top: top_name.to_owned(),
            bottom: bottom_name.to_owned(),
        });
    }

    let mut top = hex_labels(top_case.top);
    let mut bottom = hex_labels(bottom_case.bottom);
    let top_shift = rng.u8(0..4);
    let bottom_shift = rng.u8(0..4);
    adjust_faces(&mut top, top_shift, bottom_shift);
    adjust_faces(&mut bottom, top_shift, bottom_shift);

    rotate_layer(&mut top, LAYER_ROTATIONS[rng.usize(..LAYER_ROTATIONS.len())]);
    rotate_layer(&mut bottom, LAYER_ROTATIONS[rng.usize(..LAYER_ROTATIONS.len())]);

    let middle_swapped = match middle_layer_mode {
        MiddleLayerMode::Swapped => true,
        MiddleLayerMode::Unswapped => false,
        MiddleLayerMode::Random => rng.bool(),
    };

    let hex = format!(
        "{}{}{}",
        hex_string(&top),
        if middle_swapped { '/' } else { '|' },
        hex_string(&bottom)
    );
    trace!("Generated {case_name} as {hex}");
    hex.parse().map_err(|source| CaseError::InvalidState {
        name: case_name.to_owned(),
        source,
    })
}
