//! Longueur de façade : portion de la limite de parcelle à moins de `r` d'une route
//!
//! Équivaut à intersecter l'anneau extérieur avec le tampon de rayon `r` de
//! l'union des routes. Pour un segment de limite AB et un segment de route S,
//! t ↦ dist(A + t·(B - A), S) est convexe : les points à moins de `r` forment
//! un seul intervalle de t, trouvé par recherche ternaire puis dichotomie.
//! Les intervalles de toutes les routes sont fusionnés par segment de limite.
//!
//! Une route surfacique couvre aussi son intérieur : la partie de AB située
//! dans le polygone est découpée aux croisements avec ses anneaux.

use geo::{BoundingRect, Contains, Coord, EuclideanDistance, Line, MultiPolygon, Point, Polygon};

use crate::features::FeatureGeometry;

const TERNARY_ITERATIONS: usize = 100;
const BISECT_ITERATIONS: usize = 60;

/// Découpe les géométries de route en segments (un point devient un segment nul)
pub(crate) fn road_segments(roads: &[FeatureGeometry]) -> Vec<Line> {
    let mut segments = Vec::new();
    for road in roads {
        match road {
            FeatureGeometry::Point(p) => segments.push(Line::new(p.0, p.0)),
            FeatureGeometry::Line(ls) => {
                if ls.0.len() == 1 {
                    segments.push(Line::new(ls.0[0], ls.0[0]));
                }
                segments.extend(ls.lines());
            }
            FeatureGeometry::Area(poly) => {
                segments.extend(poly.exterior().lines());
                for ring in poly.interiors() {
                    segments.extend(ring.lines());
                }
            }
        }
    }
    segments
}

/// Longueur des anneaux extérieurs de `parcel` situés à moins de `radius` des routes
pub fn facade_length(parcel: &MultiPolygon, roads: &[FeatureGeometry], radius: f64) -> f64 {
    if roads.is_empty() {
        return 0.0;
    }
    let segments = road_segments(roads);
    let areas: Vec<&Polygon> = roads
        .iter()
        .filter_map(|road| match road {
            FeatureGeometry::Area(poly) => Some(poly),
            _ => None,
        })
        .collect();

    parcel
        .iter()
        .flat_map(|polygon| polygon.exterior().lines())
        .map(|edge| covered_length(edge, &segments, &areas, radius))
        .sum()
}

/// Longueur de `edge` à moins de `radius` d'un segment ou dans une route surfacique
fn covered_length(edge: Line, segments: &[Line], areas: &[&Polygon], radius: f64) -> f64 {
    let length = edge_length(edge);
    if length == 0.0 {
        return 0.0;
    }

    let mut intervals: Vec<(f64, f64)> = segments
        .iter()
        .filter(|s| bbox_gap(edge, **s) <= radius)
        .filter_map(|s| within_interval(edge, *s, radius))
        .collect();
    for area in areas {
        intervals.extend(inside_intervals(edge, area));
    }

    if intervals.is_empty() {
        return 0.0;
    }

    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut covered = 0.0;
    let (mut start, mut end) = intervals[0];
    for &(lo, hi) in &intervals[1..] {
        if lo > end {
            covered += end - start;
            start = lo;
            end = hi;
        } else if hi > end {
            end = hi;
        }
    }
    covered += end - start;

    covered * length
}

/// Intervalle [t0, t1] ⊂ [0, 1] où le point de `edge` est à moins de `radius` de `segment`
fn within_interval(edge: Line, segment: Line, radius: f64) -> Option<(f64, f64)> {
    let dist = |t: f64| Point(lerp(edge, t)).euclidean_distance(&segment);

    // Minimum de la fonction convexe
    let (mut a, mut b) = (0.0_f64, 1.0_f64);
    for _ in 0..TERNARY_ITERATIONS {
        let m1 = a + (b - a) / 3.0;
        let m2 = b - (b - a) / 3.0;
        if dist(m1) <= dist(m2) {
            b = m2;
        } else {
            a = m1;
        }
    }
    let t_min = (a + b) / 2.0;
    if dist(t_min) > radius {
        return None;
    }

    let lo = if dist(0.0) <= radius {
        0.0
    } else {
        // dist(outside) > radius, dist(inside) <= radius
        let (mut outside, mut inside) = (0.0, t_min);
        for _ in 0..BISECT_ITERATIONS {
            let mid = (outside + inside) / 2.0;
            if dist(mid) <= radius {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        inside
    };

    let hi = if dist(1.0) <= radius {
        1.0
    } else {
        let (mut inside, mut outside) = (t_min, 1.0);
        for _ in 0..BISECT_ITERATIONS {
            let mid = (outside + inside) / 2.0;
            if dist(mid) <= radius {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        inside
    };

    Some((lo, hi))
}

/// Intervalles de t où le point de `edge` est à l'intérieur de `area`
fn inside_intervals(edge: Line, area: &Polygon) -> Vec<(f64, f64)> {
    let Some(rect) = area.bounding_rect() else {
        return Vec::new();
    };
    let (min, max) = (rect.min(), rect.max());
    if edge.start.x.max(edge.end.x) < min.x
        || edge.start.x.min(edge.end.x) > max.x
        || edge.start.y.max(edge.end.y) < min.y
        || edge.start.y.min(edge.end.y) > max.y
    {
        return Vec::new();
    }

    let mut cuts = vec![0.0, 1.0];
    let rings = std::iter::once(area.exterior()).chain(area.interiors());
    for ring in rings {
        cuts.extend(ring.lines().filter_map(|side| crossing(edge, side)));
    }
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();

    // Entre deux croisements consécutifs, l'arête est entièrement dedans ou dehors
    cuts.windows(2)
        .filter(|w| w[1] > w[0])
        .filter(|w| area.contains(&Point(lerp(edge, (w[0] + w[1]) / 2.0))))
        .map(|w| (w[0], w[1]))
        .collect()
}

/// Paramètre t du croisement de `edge` avec `side`, `None` si parallèles ou disjoints
fn crossing(edge: Line, side: Line) -> Option<f64> {
    let r = edge.delta();
    let s = side.delta();
    let denom = r.x * s.y - r.y * s.x;
    if denom == 0.0 {
        // Colinéaire : couvert par la distance nulle au bord
        return None;
    }
    let q = side.start - edge.start;
    let t = (q.x * s.y - q.y * s.x) / denom;
    let u = (q.x * r.y - q.y * r.x) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
}

fn lerp(edge: Line, t: f64) -> Coord {
    edge.start + (edge.end - edge.start) * t
}

fn edge_length(edge: Line) -> f64 {
    let d = edge.delta();
    d.x.hypot(d.y)
}

/// Écart entre les boîtes englobantes de deux segments (0 si elles se chevauchent)
fn bbox_gap(a: Line, b: Line) -> f64 {
    let gap = |a0: f64, a1: f64, b0: f64, b1: f64| {
        let (a_min, a_max) = (a0.min(a1), a0.max(a1));
        let (b_min, b_max) = (b0.min(b1), b0.max(b1));
        (b_min - a_max).max(a_min - b_max).max(0.0)
    };
    let dx = gap(a.start.x, a.end.x, b.start.x, b.end.x);
    let dy = gap(a.start.y, a.end.y, b.start.y, b.end.y);
    dx.hypot(dy)
}
