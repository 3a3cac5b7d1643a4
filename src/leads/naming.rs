//! Folder names of leads and projects.

const UNKNOWN_NAME: &str = "Unknown";

fn folded(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(UNKNOWN_NAME);
    name.to_uppercase()
}

/// `"{client_number} - {NAME}"`. A missing or blank person name becomes `UNKNOWN`.
pub fn format_lead_folder_name(client_number: i64, person_name: Option<&str>) -> String {
    format!("{client_number} - {}", folded(person_name))
}

/// `"{client_number}.{project_number} - {NAME}"`.
pub fn format_project_folder_name(
    client_number: i64,
    project_number: i64,
    project_name: &str,
) -> String {
    format!(
        "{client_number}.{project_number} - {}",
        folded(Some(project_name))
    )
}

/// Zero-padded client number for display, e.g. `0042` at width 4.
pub fn format_client_number(client_number: i64, width: usize) -> String {
    format!("{client_number:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_folder_name_uppercases_person() {
        assert_eq!(format_lead_folder_name(7, Some("jane doe")), "7 - JANE DOE");
        assert_eq!(format_lead_folder_name(1316, Some("  Ana  ")), "1316 - ANA");
    }

    #[test]
    fn blank_person_becomes_unknown() {
        assert_eq!(format_lead_folder_name(1316, None), "1316 - UNKNOWN");
        assert_eq!(format_lead_folder_name(1316, Some("   ")), "1316 - UNKNOWN");
    }

    #[test]
    fn project_folder_name_nests_numbers() {
        assert_eq!(
            format_project_folder_name(7, 2, "kitchen remodel"),
            "7.2 - KITCHEN REMODEL"
        );
    }

    #[test]
    fn case_folding_is_full_unicode() {
        assert_eq!(format_lead_folder_name(1, Some("straße")), "1 - STRASSE");
        assert_eq!(format_lead_folder_name(1, Some("zoë")), "1 - ZOË");
    }

    #[test]
    fn client_number_display_is_padded() {
        assert_eq!(format_client_number(42, 4), "0042");
        assert_eq!(format_client_number(13160, 4), "13160");
        assert_eq!(format_client_number(7, 0), "7");
    }
}
