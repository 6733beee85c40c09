//! tests/personalization_tests.rs

#[cfg(test)]
mod tests {
    use crate::models::contact_model::Contact;
    use crate::services::personalization_service::render;

    #[test]
    fn replaces_name_and_company() {
        let contact = Contact::new("Ann", "ann@acme.test").with_company("Acme");
        assert_eq!(render("{name} at {company}", &contact), "Ann at Acme");
    }

    #[test]
    fn missing_optional_field_leaves_token() {
        let contact = Contact::new("Ann", "ann@acme.test");
        assert_eq!(render("{jobTitle}", &contact), "{jobTitle}");
        assert_eq!(render("Hi {name} from {company}", &contact), "Hi Ann from {company}");
    }

    #[test]
    fn empty_optional_field_is_not_substituted() {
        let contact = Contact::new("Ann", "ann@acme.test").with_company("");
        assert_eq!(render("{company}", &contact), "{company}");
    }

    #[test]
    fn all_tokens_and_repeats() {
        let contact = Contact::new("Ann", "ann@acme.test")
            .with_company("Acme")
            .with_job_title("CTO");
        let out = render(
            "{name} <{email}> is {jobTitle} at {company}. Bye {name}!",
            &contact,
        );
        assert_eq!(out, "Ann <ann@acme.test> is CTO at Acme. Bye Ann!");
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let contact = Contact::new("Ann", "ann@acme.test");
        assert_eq!(
            render("{Name} {job_title} {surname}", &contact),
            "{Name} {job_title} {surname}"
        );
    }
}
