use inventory_core::*;

#[cfg(test)]
mod gate_table_tests {
    use super::*;

    #[test]
    fn test_every_protected_page_redirects_without_session() {
        let pages = [
            "/dashboard",
            "/add-resource-allocation",
            "/update-resource-allocation",
            "/delete-resources",
            "/person-view",
            "/available-resources",
            "/some/unknown/page",
        ];

        for page in pages {
            let decision = evaluate(page, Some("a=1"), false);
            assert_eq!(
                decision,
                GateDecision::RedirectToLogin { from: format!("{}?a=1", page) },
                "Should redirect {} to login",
                page
            );
            let location = decision.location().unwrap();
            assert!(location.starts_with("/?from=%2F"), "Unexpected location {}", location);
        }
    }

    #[test]
    fn test_every_protected_page_passes_with_session() {
        for page in ["/dashboard", "/person-view", "/available-resources"] {
            assert_eq!(evaluate(page, None, true), GateDecision::PassThrough);
        }
    }

    #[test]
    fn test_redirect_round_trip_into_login_return_path() {
        let decision = evaluate("/person-view", Some("name=Priya"), false);
        let GateDecision::RedirectToLogin { from } = decision else {
            panic!("expected login redirect");
        };
        assert_eq!(safe_return_path(Some(&from)), "/person-view?name=Priya");
    }
}

#[cfg(test)]
mod form_tests {
    use super::*;
    use inventory_core::validation::{validate_new_allocation, validate_person_query};

    #[test]
    fn test_allocation_form_flow() {
        let mut form = NewAllocation {
            name: "Rahul Deshpande".to_string(),
            serial_number: "FVFXQ0AAJ1WK".to_string(),
            allocation_date: "2024-05-02".to_string(),
            po: "PO-2231".to_string(),
            location: "Bangalore".to_string(),
            email: "rahul.deshpande@gmail.com".to_string(),
            detail: "Developer laptop".to_string(),
        };

        let mut errors = validate_new_allocation(&form);
        assert_eq!(errors.len(), 1);
        assert!(errors.get("email").is_some());

        form.email = "rahul.deshpande@t-systems.com".to_string();
        errors.remove("email");
        assert!(errors.is_empty());
        assert!(validate_new_allocation(&form).is_empty());
    }

    #[test]
    fn test_person_query_requires_both_fields() {
        let errors = validate_person_query(&PersonQuery::default());
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
    }
}
