//! Accuracy of model point forecasts against the observed season.

use crate::state::{DashboardData, Selection};
use flu_data::derived::max_lag_series;
use serde::Serialize;
use std::collections::HashMap;

/// Number of weeks ahead a model forecasts.
pub const HORIZONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Score {
    MeanAbsoluteError,
    RootMeanSquaredError,
}

impl Score {
    /// Scores in selection order.
    pub const ALL: [Score; 2] = [Score::MeanAbsoluteError, Score::RootMeanSquaredError];

    pub fn from_index(idx: usize) -> Option<Score> {
        Score::ALL.get(idx).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Score::MeanAbsoluteError => "Mean Absolute Error",
            Score::RootMeanSquaredError => "Root Mean Squared Error",
        }
    }

    /// `None` when there is nothing to score.
    pub fn evaluate(&self, errors: &[f64]) -> Option<f64> {
        if errors.is_empty() {
            return None;
        }
        let n = errors.len() as f64;
        Some(match self {
            Score::MeanAbsoluteError => errors.iter().map(|e| e.abs()).sum::<f64>() / n,
            Score::RootMeanSquaredError => (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt(),
        })
    }
}

/// Score of one model, per horizon (1 to 4 weeks ahead).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStat {
    pub id: String,
    pub values: [Option<f64>; HORIZONS],
}

/// The selected score of every model of the selected region and season.
/// Weeks without an observed value are not scored.
pub fn model_stats(data: &DashboardData, selection: &Selection) -> Vec<ModelStat> {
    let Some(season) = data.season(selection.region, selection.season) else {
        return Vec::new();
    };
    let score = Score::from_index(selection.score).unwrap_or(Score::MeanAbsoluteError);
    let actual = max_lag_series(&season.actual);
    let position: HashMap<_, _> = actual
        .iter()
        .enumerate()
        .map(|(idx, d)| (d.week, idx))
        .collect();

    season
        .models
        .iter()
        .map(|model| {
            let mut errors: [Vec<f64>; HORIZONS] = Default::default();
            for prediction in &model.predictions {
                let Some(&idx) = position.get(&prediction.week) else {
                    continue;
                };
                for (ahead, point) in prediction.point.iter().enumerate() {
                    let target = actual.get(idx + ahead + 1).filter(|d| !d.is_missing());
                    if let (Some(point), Some(target)) = (point, target) {
                        errors[ahead].push(point - target.data);
                    }
                }
            }
            ModelStat {
                id: model.id.clone(),
                values: errors.map(|e| score.evaluate(&e)),
            }
        })
        .collect()
}
