//! Statistiques descriptives sur les altitudes échantillonnées

/// Percentile `p` (0..=100) avec interpolation linéaire entre rangs
///
/// `sorted` doit être trié et non vide.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

pub fn median(sorted: &[f64]) -> f64 {
    percentile(sorted, 50.0)
}

/// Copie triée
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Grille régulière d'altitudes (None = non échantillonné)
pub struct Grid {
    pub nx: usize,
    pub ny: usize,
    /// Espacement réel entre nœuds (m)
    pub dx: f64,
    pub dy: f64,
    pub values: Vec<Option<f64>>,
}

impl Grid {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.nx && j < self.ny {
            self.values[i * self.ny + j]
        } else {
            None
        }
    }

    /// Différence finie le long d'un axe : avant si possible, sinon arrière
    fn derivative(&self, i: usize, j: usize, along_x: bool) -> Option<f64> {
        let h = self.get(i, j)?;
        let (step, fwd, bwd) = if along_x {
            (self.dx, self.get(i + 1, j), i.checked_sub(1).and_then(|i| self.get(i, j)))
        } else {
            (self.dy, self.get(i, j + 1), j.checked_sub(1).and_then(|j| self.get(i, j)))
        };
        match (fwd, bwd) {
            (Some(f), _) => Some((f - h) / step),
            (None, Some(b)) => Some((h - b) / step),
            (None, None) => None,
        }
    }

    /// Pente locale (%) au nœud (i, j)
    pub fn grade_pct(&self, i: usize, j: usize) -> Option<f64> {
        let gx = self.derivative(i, j, true)?;
        let gy = self.derivative(i, j, false)?;
        Some(gx.hypot(gy) * 100.0)
    }
}

/// Pente moyenne (%) sur les nœuds donnés, bornée à [0, 100] ; 0 si aucun gradient
pub fn mean_grade(grid: &Grid, nodes: &[(usize, usize)]) -> f64 {
    let grades: Vec<f64> = nodes
        .iter()
        .filter_map(|&(i, j)| grid.grade_pct(i, j))
        .collect();
    if grades.is_empty() {
        return 0.0;
    }
    let mean = grades.iter().sum::<f64>() / grades.len() as f64;
    mean.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_matches_linear_interpolation() {
        let v = sorted(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(median(&v), 2.5);
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 4.0);
        // rang 0.95 * 3 = 2.85
        assert!((percentile(&v, 95.0) - 3.85).abs() < 1e-12);
    }

    #[test]
    fn test_single_value() {
        let v = [7.0];
        assert_eq!(median(&v), 7.0);
        assert_eq!(percentile(&v, 95.0), 7.0);
    }

    fn plane(nx: usize, ny: usize, step: f64, slope_x: f64) -> Grid {
        let mut values = Vec::new();
        for i in 0..nx {
            for _ in 0..ny {
                values.push(Some(i as f64 * step * slope_x));
            }
        }
        Grid {
            nx,
            ny,
            dx: step,
            dy: step,
            values,
        }
    }

    #[test]
    fn test_grade_on_inclined_plane() {
        let grid = plane(4, 4, 30.0, 0.05);
        let nodes: Vec<_> = (0..4).flat_map(|i| (0..4).map(move |j| (i, j))).collect();
        assert!((mean_grade(&grid, &nodes) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_node_has_no_grade() {
        let mut grid = plane(3, 3, 30.0, 0.1);
        grid.values = vec![None; 9];
        grid.values[4] = Some(10.0);
        assert_eq!(grid.grade_pct(1, 1), None);
        assert_eq!(mean_grade(&grid, &[(1, 1)]), 0.0);
    }

    #[test]
    fn test_grade_is_clamped() {
        let grid = plane(3, 3, 1.0, 5.0);
        assert_eq!(mean_grade(&grid, &[(0, 0)]), 100.0);
    }
}
