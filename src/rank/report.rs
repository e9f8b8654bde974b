use std::io::{self, Write};

use crate::predict::{RejectedRecord, Subpoint};
use crate::rank::ranking::{Candidate, Ranking};

pub fn write_candidates<W: Write>(out: &mut W, candidates: &[Candidate]) -> io::Result<()> {
    for candidate in candidates {
        writeln!(out, "Satellite: {}", candidate.satellite)?;
        writeln!(out, "Degree of Separation: {:.3}°", candidate.separation_deg)?;
        writeln!(out, "Altitude: {:.2} degrees", candidate.altitude_deg)?;
        writeln!(out, "Azimuth: {:.2} degrees", candidate.azimuth_deg)?;
        writeln!(out, "Distance: {:.2} km", candidate.range_km)?;
        writeln!(out, "---")?;
    }
    Ok(())
}

pub fn write_ranking<W: Write>(out: &mut W, ranking: &Ranking) -> io::Result<()> {
    if ranking.candidates.is_empty() {
        writeln!(out, "No satellites matched the observation")?;
        return Ok(());
    }
    write_candidates(out, &ranking.candidates)
}

pub fn write_subpoints<W: Write>(out: &mut W, subpoints: &[Subpoint]) -> io::Result<()> {
    for point in subpoints {
        writeln!(
            out,
            "{}: lat {:.4}°, lon {:.4}°, elevation {:.2} km",
            point.satellite, point.latitude_deg, point.longitude_deg, point.elevation_km
        )?;
    }
    Ok(())
}

/// Entries of the records file that never reached propagation
pub fn write_rejected<W: Write>(out: &mut W, rejected: &[RejectedRecord]) -> io::Result<()> {
    if rejected.is_empty() {
        return Ok(());
    }
    writeln!(out, "{} unreadable records skipped:", rejected.len())?;
    for entry in rejected {
        writeln!(
            out,
            "  #{} {}: {}",
            entry.index,
            entry.name.as_deref().unwrap_or("Unknown"),
            entry.message
        )?;
    }
    Ok(())
}
