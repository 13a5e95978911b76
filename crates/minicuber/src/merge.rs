//! Coordinate-aligned merging of regridded provider output.
//!
//! Merging is an outer join along time: the merged time axis is the sorted
//! union of both sides and time-dependent variables are reindexed onto it
//! with NaN fill. When two sources write the same variable at the same
//! timestamp the first value written is kept; later sources only fill
//! cells that are still NaN.

use chrono::{DateTime, Utc};
use cube_common::{
    Cube, CubeDataError, CubeResult, DataVariable, RegriddedCube, TimeInterval, VariableLayout,
};
use std::collections::HashMap;

/// Prefix every variable name with `prefix` unless it already carries it.
///
/// Also records `provider` as the variable's source when the provider left
/// it blank.
pub fn namespace(variables: &mut [DataVariable], prefix: &str, provider: &str) {
    let tag = format!("{}_", prefix);
    for variable in variables {
        if !variable.descriptor.name.starts_with(&tag) {
            variable.descriptor.name = format!("{}{}", tag, variable.descriptor.name);
        }
        if variable.descriptor.provider.is_empty() {
            variable.descriptor.provider = provider.to_string();
        }
    }
}

/// Merge `incoming` into `cube`.
pub fn merge_into(cube: &mut Cube, incoming: RegriddedCube) -> CubeResult<()> {
    let (ny, nx) = cube.shape();
    if incoming.lat.len() != ny || incoming.lon.len() != nx {
        return Err(CubeDataError::ShapeMismatch {
            name: "grid".to_string(),
            expected: ny * nx,
            actual: incoming.lat.len() * incoming.lon.len(),
        });
    }
    check_layouts(cube, &incoming)?;
    let plane = ny * nx;
    let incoming_time = incoming.time.unwrap_or_default();

    let mut union: Vec<DateTime<Utc>> = cube.time.iter().chain(&incoming_time).copied().collect();
    union.sort();
    union.dedup();
    if union != cube.time {
        for variable in cube.variables.iter_mut().filter(|v| v.layout.has_time()) {
            variable.data = reindex(&variable.data, &cube.time, &union, step_len(variable, plane));
        }
        cube.time = union;
    }

    // Target index of every incoming step; repeats after the first are dropped
    let positions: HashMap<DateTime<Utc>, usize> =
        cube.time.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let mut seen = Vec::with_capacity(incoming_time.len());
    let steps: Vec<Option<usize>> = incoming_time
        .iter()
        .map(|t| {
            if seen.contains(t) {
                None
            } else {
                seen.push(*t);
                positions.get(t).copied()
            }
        })
        .collect();

    let nt = cube.time.len();
    for variable in incoming.variables {
        let len = step_len(&variable, plane);

        let index = match cube.variables.iter().position(|v| v.name() == variable.name()) {
            Some(i) => i,
            None => {
                let total = variable.layout.len(nt, ny, nx);
                cube.variables.push(DataVariable::new(
                    variable.descriptor.clone(),
                    variable.layout,
                    vec![f32::NAN; total],
                ));
                cube.variables.len() - 1
            }
        };
        let target = &mut cube.variables[index].data;

        if variable.layout.has_time() {
            for (src, dst) in steps.iter().enumerate() {
                if let Some(dst) = dst {
                    fill_nan(
                        &mut target[dst * len..(dst + 1) * len],
                        &variable.data[src * len..(src + 1) * len],
                    );
                }
            }
        } else {
            fill_nan(target, &variable.data);
        }
    }

    Ok(())
}

/// Reject `incoming` before anything is written when one of its variables
/// clashes in layout with an existing variable or with another incoming one.
fn check_layouts(cube: &Cube, incoming: &RegriddedCube) -> CubeResult<()> {
    let mut layouts: HashMap<&str, VariableLayout> = cube
        .variables
        .iter()
        .map(|v| (v.name(), v.layout))
        .collect();
    for variable in &incoming.variables {
        match layouts.get(variable.name()) {
            Some(layout) if *layout != variable.layout => {
                return Err(CubeDataError::DuplicateVariable(variable.name().to_string()));
            }
            Some(_) => {}
            None => {
                layouts.insert(variable.name(), variable.layout);
            }
        }
    }
    Ok(())
}

/// Drop every timestamp outside `interval`, along with its data.
pub fn clip_time(cube: &mut Cube, interval: &TimeInterval) {
    let keep: Vec<usize> = cube
        .time
        .iter()
        .enumerate()
        .filter(|(_, t)| interval.contains(t))
        .map(|(i, _)| i)
        .collect();
    if keep.len() == cube.time.len() {
        return;
    }

    let (ny, nx) = cube.shape();
    for variable in cube.variables.iter_mut().filter(|v| v.layout.has_time()) {
        let len = step_len(variable, ny * nx);
        variable.data = keep
            .iter()
            .flat_map(|&i| variable.data[i * len..(i + 1) * len].iter().copied())
            .collect();
    }
    cube.time = keep.iter().map(|&i| cube.time[i]).collect();
}

/// Values per time step: one plane for gridded data, one scalar for series.
fn step_len(variable: &DataVariable, plane: usize) -> usize {
    if variable.layout.is_spatial() {
        plane
    } else {
        1
    }
}

fn reindex(
    data: &[f32],
    from: &[DateTime<Utc>],
    to: &[DateTime<Utc>],
    len: usize,
) -> Vec<f32> {
    let mut out = vec![f32::NAN; to.len() * len];
    for (src, t) in from.iter().enumerate() {
        if let Ok(dst) = to.binary_search(t) {
            out[dst * len..(dst + 1) * len].copy_from_slice(&data[src * len..(src + 1) * len]);
        }
    }
    out
}

fn fill_nan(target: &mut [f32], source: &[f32]) {
    for (t, s) in target.iter_mut().zip(source) {
        if t.is_nan() {
            *t = *s;
        }
    }
}
