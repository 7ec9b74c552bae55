//! Bounded Nelder-Mead simplex minimizer shared by the smoothing and ARIMA fitters.
//!
//! Every call runs under a fixed iteration budget, so fitting never hangs.

pub(crate) struct NelderMeadBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl NelderMeadBounds {
    fn project(&self, mut point: Vec<f64>) -> Vec<f64> {
        for ((v, lo), hi) in point.iter_mut().zip(&self.lower).zip(&self.upper) {
            *v = v.clamp(*lo, *hi);
        }
        point
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NelderMeadResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    /// Simplex diameter fell below the tolerance within the budget.
    pub converged: bool,
}

/// Vertices kept sorted best (lowest objective) first.
struct Simplex {
    vertices: Vec<(Vec<f64>, f64)>,
}

impl Simplex {
    fn sort(&mut self) {
        self.vertices.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    fn best(&self) -> &(Vec<f64>, f64) {
        &self.vertices[0]
    }

    fn worst(&self) -> &(Vec<f64>, f64) {
        &self.vertices[self.vertices.len() - 1]
    }

    fn second_worst_value(&self) -> f64 {
        self.vertices[self.vertices.len() - 2].1
    }

    /// Largest coordinate gap between the best and worst vertex.
    fn diameter(&self) -> f64 {
        self.best()
            .0
            .iter()
            .zip(&self.worst().0)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let keep = &self.vertices[..self.vertices.len() - 1];
        let dim = keep[0].0.len();
        (0..dim)
            .map(|j| keep.iter().map(|(p, _)| p[j]).sum::<f64>() / keep.len() as f64)
            .collect()
    }

    fn replace_worst(&mut self, point: Vec<f64>, value: f64) {
        let last = self.vertices.len() - 1;
        self.vertices[last] = (point, value);
    }
}

/// `from + t * (to - from)`, projected into the bounds.
fn along(from: &[f64], to: &[f64], t: f64, bounds: &NelderMeadBounds) -> Vec<f64> {
    bounds.project(
        from.iter()
            .zip(to)
            .map(|(f, g)| f + t * (g - f))
            .collect(),
    )
}

pub(crate) fn nelder_mead<F>(
    f: F,
    initial: &[f64],
    bounds: &NelderMeadBounds,
    max_iter: usize,
    tol: f64,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let start = bounds.project(initial.to_vec());

    // Initial simplex: one step of 10% of the box width along each axis,
    // stepping inwards when the start sits on the upper bound.
    let mut vertices = vec![(start.clone(), f(&start))];
    for i in 0..start.len() {
        let step = 0.1 * (bounds.upper[i] - bounds.lower[i]);
        let mut vertex = start.clone();
        vertex[i] = if start[i] + step <= bounds.upper[i] {
            start[i] + step
        } else {
            (start[i] - step).max(bounds.lower[i])
        };
        let value = f(&vertex);
        vertices.push((vertex, value));
    }
    let mut simplex = Simplex { vertices };

    let mut converged = false;
    let mut iterations = 0;

    while iterations < max_iter {
        iterations += 1;
        simplex.sort();

        if simplex.diameter() < tol {
            converged = true;
            break;
        }

        let centroid = simplex.centroid();
        let (worst, worst_value) = simplex.worst().clone();
        let best_value = simplex.best().1;

        let reflected = along(&centroid, &worst, -1.0, bounds);
        let reflected_value = f(&reflected);

        if reflected_value < best_value {
            let expanded = along(&centroid, &worst, -2.0, bounds);
            let expanded_value = f(&expanded);
            if expanded_value < reflected_value {
                simplex.replace_worst(expanded, expanded_value);
            } else {
                simplex.replace_worst(reflected, reflected_value);
            }
            continue;
        }

        if reflected_value < simplex.second_worst_value() {
            simplex.replace_worst(reflected, reflected_value);
            continue;
        }

        // Contract towards the better of the worst vertex and its reflection.
        let (anchor, anchor_value) = if reflected_value < worst_value {
            (reflected, reflected_value)
        } else {
            (worst, worst_value)
        };
        let contracted = along(&centroid, &anchor, 0.5, bounds);
        let contracted_value = f(&contracted);
        if contracted_value < anchor_value {
            simplex.replace_worst(contracted, contracted_value);
            continue;
        }

        // Shrink every vertex halfway towards the best one.
        let best = simplex.best().0.clone();
        for vertex in simplex.vertices.iter_mut().skip(1) {
            let point = along(&best, &vertex.0, 0.5, bounds);
            let value = f(&point);
            *vertex = (point, value);
        }
    }

    simplex.sort();
    let (point, value) = simplex.best().clone();

    NelderMeadResult {
        point,
        value,
        iterations,
        converged,
    }
}
