//! Identifiant stable des parcelles
//!
//! L'identifiant dérive de la référence cadastrale et du contour. Le contour est
//! normalisé pour être indépendant du sommet de départ : un même relevé
//! réimporté avec un anneau décalé donne le même identifiant.

use blake3::Hasher;

/// Longueur de l'identifiant en caractères hexadécimaux
const ID_HEX_LEN: usize = 16;

/// Calcule l'identifiant d'une parcelle
pub fn parcel_fingerprint(parcel_id: &str, boundary: &[(f64, f64)]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"PARCEL");
    hasher.update(parcel_id.trim().as_bytes());
    hasher.update(b"RING");
    hash_ring_normalized(&mut hasher, boundary);

    let hash = hasher.finalize();
    let mut id = hex::encode(hash.as_bytes());
    id.truncate(ID_HEX_LEN);
    id
}

/// Hash un anneau en commençant au sommet lexicographiquement le plus petit
fn hash_ring_normalized(hasher: &mut Hasher, ring: &[(f64, f64)]) {
    // Le sommet de fermeture répète le premier
    let len = if ring.len() > 1 && ring.first() == ring.last() {
        ring.len() - 1
    } else {
        ring.len()
    };

    if len == 0 {
        return;
    }

    let min_idx = (0..len)
        .min_by(|&a, &b| {
            let (ax, ay) = ring[a];
            let (bx, by) = ring[b];
            ax.total_cmp(&bx).then_with(|| ay.total_cmp(&by))
        })
        .unwrap_or(0);

    for i in 0..len {
        hash_coord(hasher, ring[(min_idx + i) % len]);
    }
}

/// Hash une coordonnée arrondie à 6 décimales
fn hash_coord(hasher: &mut Hasher, (x, y): (f64, f64)) {
    let x = (x * 1_000_000.0).round() as i64;
    let y = (y * 1_000_000.0).round() as i64;
    hasher.update(&x.to_le_bytes());
    hasher.update(&y.to_le_bytes());
}
