//! Export GeoJSON pour la couche carte (streaming avec geozero)
//!
//! Coordonnées en WGS84, ordre `[lng, lat]`. Les parcelles signalées n'ont
//! pas de géométrie et sont comptées sans être écrites.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, LineString, Polygon};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use serde_json::json;
use tracing::debug;

use parcel_geo::LatLng;

use crate::model::Parcel;

/// Statistiques d'un export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub written: usize,
    /// Parcelles sans géométrie (signalées)
    pub skipped: usize,
}

/// Exporte des parcelles dans un fichier GeoJSON
pub fn export_to_geojson<'a, I>(parcels: I, output_path: &Path) -> Result<ExportStats>
where
    I: IntoIterator<Item = &'a Parcel>,
{
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let stats = write_feature_collection(parcels, &mut writer)?;
    writer.flush()?;

    debug!(
        path = %output_path.display(),
        written = stats.written,
        skipped = stats.skipped,
        "GeoJSON exported"
    );
    Ok(stats)
}

/// Écrit une FeatureCollection complète
pub fn write_feature_collection<'a, I, W>(parcels: I, writer: &mut W) -> Result<ExportStats>
where
    I: IntoIterator<Item = &'a Parcel>,
    W: Write,
{
    let mut stats = ExportStats::default();

    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::4326"}}}},"features":["#
    )?;

    for parcel in parcels {
        let Some(coords) = parcel.geometry.as_deref() else {
            stats.skipped += 1;
            continue;
        };

        if stats.written > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, parcel, coords)?;
        stats.written += 1;
    }

    write!(writer, "]}}")?;
    Ok(stats)
}

/// Polygone fermé, x = longitude, y = latitude
fn to_polygon(coords: &[LatLng]) -> Polygon {
    // LineString est refermée par Polygon::new si besoin
    let exterior: LineString = coords.iter().map(|p| (p.lng, p.lat)).collect::<Vec<_>>().into();
    Polygon::new(exterior, vec![])
}

/// Écrit une feature GeoJSON
fn write_feature<W: Write>(writer: &mut W, parcel: &Parcel, coords: &[LatLng]) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":{},"#,
        serde_json::to_string(&parcel.id)?
    )?;

    // Géométrie via geozero
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::Polygon(to_polygon(coords)).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    let properties = json!({
        "id": parcel.id,
        "parcelId": parcel.parcel_id,
        "lotNumber": parcel.lot_number,
        "displayName": parcel.label(),
        "status": parcel.status,
        "areaHectares": parcel.area_hectares,
        "totalCost": parcel.total_cost,
    });
    write!(writer, r#","properties":{}}}"#, properties)?;

    Ok(())
}
