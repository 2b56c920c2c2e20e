/// Everything that can go wrong between fetching the sources and drawing a frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// A source could not be fetched or parsed. Fatal for the session.
    #[error("data unavailable from {origin}: {reason}")]
    DataUnavailable { origin: String, reason: String },
    /// The selected country has no row in one of the tables.
    #[error("no {table} data for {country:?}")]
    NoMatch { country: String, table: &'static str },
    /// An expected column is absent from the population table.
    #[error("missing column {column:?}")]
    MissingColumn { column: String },
    /// The column exists but the selected country's cell is empty.
    #[error("{country:?} has no value in column {column:?}")]
    MissingValue { country: String, column: String },
    /// A derived figure would divide by zero: no boundary area, or no world total.
    #[error("{quantity} is zero for {country:?}")]
    ZeroDivisor { country: String, quantity: &'static str },
}

impl DashboardError {
    pub fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::DataUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// Recoverable errors turn into a warning; the user picks another country.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::NoMatch { .. }
                | DashboardError::MissingValue { .. }
                | DashboardError::ZeroDivisor { .. }
        )
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        let no_match = DashboardError::NoMatch {
            country: "Atlantis".into(),
            table: "geometry",
        };
        let missing = DashboardError::MissingColumn {
            column: "1999 Population".into(),
        };
        assert!(no_match.is_recoverable());
        assert!(DashboardError::ZeroDivisor {
            country: "Atlantis".into(),
            quantity: "area",
        }
        .is_recoverable());
        assert!(!missing.is_recoverable());
        assert!(!DashboardError::unavailable("x.csv", "boom").is_recoverable());
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = DashboardError::unavailable("world.geojson", "not found");
        assert_eq!(err.to_string(), "data unavailable from world.geojson: not found");
        let err = DashboardError::MissingColumn {
            column: "2022 Population".into(),
        };
        assert!(err.to_string().contains("2022 Population"));
    }
}
