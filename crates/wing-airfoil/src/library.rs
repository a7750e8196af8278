use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wing_core::{Result, WingError};

use crate::profile::Airfoil;

/// Named store of normalized airfoil profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirfoilLibrary {
    profiles: BTreeMap<String, Airfoil>,
}

impl AirfoilLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, airfoil: Airfoil) {
        self.profiles.insert(airfoil.name.clone(), airfoil);
    }

    pub fn get(&self, name: &str) -> Result<&Airfoil> {
        self.profiles
            .get(name)
            .ok_or_else(|| WingError::NotFound(format!("airfoil {name}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Blend two profiles by pointwise linear interpolation.
///
/// `ratio` 0 returns `a` unchanged, 1 returns `b` unchanged. Profiles with
/// differing point counts are resampled to a common count first; the blend
/// fails with `IncompatibleProfile` if the result self-intersects.
pub fn blend(a: &Airfoil, b: &Airfoil, ratio: f64) -> Result<Airfoil> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(WingError::InvalidOperation(format!(
            "blend ratio must be in [0, 1], got {ratio}"
        )));
    }
    if ratio == 0.0 {
        return Ok(a.clone());
    }
    if ratio == 1.0 {
        return Ok(b.clone());
    }

    let (a, b) = match_point_counts(a, b)?;

    let points = a
        .points()
        .iter()
        .zip(b.points())
        .map(|(&pa, &pb)| pa + (pb - pa) * ratio)
        .collect();

    let name = format!("{}+{}@{:.3}", a.name, b.name, ratio);
    Airfoil::new(name, points).map_err(|_| {
        WingError::IncompatibleProfile(format!(
            "blend of {} and {} at ratio {ratio} self-intersects",
            a.name, b.name
        ))
    })
}

fn match_point_counts(a: &Airfoil, b: &Airfoil) -> Result<(Airfoil, Airfoil)> {
    if a.point_count() == b.point_count()
        && a.leading_edge_index() == b.leading_edge_index()
    {
        return Ok((a.clone(), b.clone()));
    }
    // Resample both to the larger count, made odd
    let n = a.point_count().max(b.point_count()) | 1;
    Ok((a.resample(n)?, b.resample(n)?))
}
