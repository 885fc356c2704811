//! Validation des anneaux de contour

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};

use crate::GeoError;

/// Caractéristiques d'un anneau valide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingInfo {
    /// Nombre de sommets distincts
    pub distinct_vertices: usize,
    /// Vrai si le dernier sommet répète le premier
    pub closed: bool,
}

/// Valide un anneau de contour.
///
/// Un anneau non fermé explicitement est accepté et traité comme fermé.
///
/// # Errors
///
/// - [`GeoError::NonFiniteCoordinate`] pour une valeur NaN ou infinie
/// - [`GeoError::TooFewVertices`] si moins de 3 sommets distincts
/// - [`GeoError::SelfIntersecting`] si deux arêtes se croisent ou se chevauchent
pub fn validate_ring(ring: &[(f64, f64)]) -> Result<RingInfo, GeoError> {
    if let Some(index) = ring
        .iter()
        .position(|&(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(GeoError::NonFiniteCoordinate { index });
    }

    let vertices = open_ring(ring);
    let distinct = count_distinct(&vertices);
    if distinct < 3 {
        return Err(GeoError::TooFewVertices { count: distinct });
    }

    let closed = ring.len() > 1 && coords_equal(ring[0], ring[ring.len() - 1]);

    if let Some((first, second)) = find_self_intersection(&vertices) {
        return Err(GeoError::SelfIntersecting { first, second });
    }

    Ok(RingInfo {
        distinct_vertices: distinct,
        closed,
    })
}

/// Anneau sans doublons consécutifs ni sommet de fermeture
pub fn open_ring(ring: &[(f64, f64)]) -> Vec<Coord> {
    let mut vertices: Vec<Coord> = Vec::with_capacity(ring.len());
    for &(x, y) in ring {
        if vertices
            .last()
            .map_or(true, |last| !coords_equal((last.x, last.y), (x, y)))
        {
            vertices.push(Coord { x, y });
        }
    }
    while vertices.len() > 1 {
        let first = vertices[0];
        let last = vertices[vertices.len() - 1];
        if coords_equal((first.x, first.y), (last.x, last.y)) {
            vertices.pop();
        } else {
            break;
        }
    }
    vertices
}

/// Cherche une paire d'arêtes en intersection (O(n²), les contours de parcelles restent petits)
fn find_self_intersection(vertices: &[Coord]) -> Option<(usize, usize)> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    let edges: Vec<Line> = (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                // Deux arêtes consécutives partagent leur sommet commun
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return Some((i, j)),
            }
        }
    }
    None
}

/// Nombre de sommets deux à deux distincts, à la tolérance de [`coords_equal`]
fn count_distinct(vertices: &[Coord]) -> usize {
    vertices
        .iter()
        .enumerate()
        .filter(|&(i, c)| {
            !vertices[..i]
                .iter()
                .any(|prev| coords_equal((prev.x, prev.y), (c.x, c.y)))
        })
        .count()
}

/// Compare deux coordonnées avec tolérance
fn coords_equal(a: (f64, f64), b: (f64, f64)) -> bool {
    const TOLERANCE: f64 = 1e-9;
    (a.0 - b.0).abs() < TOLERANCE && (a.1 - b.1).abs() < TOLERANCE
}
