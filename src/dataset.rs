//! Synthetic grouped 3D points
//!
//! Columns x, y, z hold uniform samples in [0, 1). The group column labels
//! rows in contiguous blocks: group 0 owns the first `rows_per_group` rows,
//! group 1 the next block, and so on. Each block is cut into lines of
//! `points_per_line` consecutive rows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use thiserror::Error;

use crate::config::DataConfig;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("{0} must be greater than zero")]
    ZeroCount(&'static str),
    #[error("num_lines ({num_lines}) is not divisible by num_groups ({num_groups})")]
    UnevenGroups { num_lines: usize, num_groups: usize },
    #[error("num_lines ({num_lines}) x points_per_line ({points_per_line}) rows do not fit in memory")]
    TooLarge { num_lines: usize, points_per_line: usize },
}

/// Column-oriented point table
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub group: Vec<usize>,
    pub num_groups: usize,
    pub lines_per_group: usize,
    pub points_per_line: usize,
}

/// One polyline's worth of rows, borrowed from the dataset
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
}

impl Dataset {
    /// Generate the table from a seed. Same config, same data.
    pub fn generate(config: &DataConfig) -> Result<Self, DatasetError> {
        config.validate()?;

        let total = config.total_rows();
        let rows_per_group = config.rows_per_group();
        let mut rng = StdRng::seed_from_u64(config.seed);

        // Whole columns in order: every x, then every y, then every z
        let x: Vec<f64> = (0..total).map(|_| rng.gen::<f64>()).collect();
        let y: Vec<f64> = (0..total).map(|_| rng.gen::<f64>()).collect();
        let z: Vec<f64> = (0..total).map(|_| rng.gen::<f64>()).collect();

        let group: Vec<usize> = (0..config.num_groups)
            .flat_map(|g| std::iter::repeat(g).take(rows_per_group))
            .collect();

        tracing::debug!(
            rows = total,
            groups = config.num_groups,
            seed = config.seed,
            "Generated synthetic dataset"
        );

        Ok(Self {
            x,
            y,
            z,
            group,
            num_groups: config.num_groups,
            lines_per_group: config.lines_per_group(),
            points_per_line: config.points_per_line,
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Distinct group labels in order of first appearance
    pub fn groups(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for &g in &self.group {
            if seen.last() != Some(&g) && !seen.contains(&g) {
                seen.push(g);
            }
        }
        seen
    }

    /// Row range owned by a group
    pub fn group_range(&self, group: usize) -> Range<usize> {
        let rows = self.lines_per_group * self.points_per_line;
        let start = group * rows;
        start..start + rows
    }

    /// Rows of the `line`-th polyline inside `group`
    ///
    /// Panics if `group` or `line` is out of range.
    pub fn line_segment(&self, group: usize, line: usize) -> Segment<'_> {
        assert!(group < self.num_groups, "group {} out of range", group);
        assert!(line < self.lines_per_group, "line {} out of range", line);

        let base = self.group_range(group).start;
        let rows = base + line * self.points_per_line..base + (line + 1) * self.points_per_line;
        Segment {
            x: &self.x[rows.clone()],
            y: &self.y[rows.clone()],
            z: &self.z[rows],
        }
    }
}
