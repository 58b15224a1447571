use crate::models::Coordinates;

/// Check that coordinates are finite and within WGS 84 ranges. The error
/// lists every problem found.
pub fn validate_coordinates(coordinates: &Coordinates) -> Result<(), String> {
    if !coordinates.latitude.is_finite() || !coordinates.longitude.is_finite() {
        return Err("coordinates must be finite".to_string());
    }

    let mut problems = Vec::new();
    if !(-90.0..=90.0).contains(&coordinates.latitude) {
        problems.push(format!("latitude {} outside [-90, 90]", coordinates.latitude));
    }
    if !(-180.0..=180.0).contains(&coordinates.longitude) {
        problems.push(format!("longitude {} outside [-180, 180]", coordinates.longitude));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(validate_coordinates(&Coordinates::new(4.6, -74.1)).is_ok());
    }

    #[test]
    fn test_non_finite_coordinates() {
        let reason = validate_coordinates(&Coordinates::new(f64::NAN, -74.1)).unwrap_err();
        assert_eq!(reason, "coordinates must be finite");
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let reason = validate_coordinates(&Coordinates::new(95.0, -190.0)).unwrap_err();
        assert!(reason.contains("latitude 95"));
        assert!(reason.contains("longitude -190"));
    }
}
