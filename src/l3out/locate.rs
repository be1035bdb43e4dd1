use serde_json::Value;

/// A located entity: its position in the ordered collection plus a borrow
/// of its stored form
#[derive(Debug, Clone, Copy)]
pub struct ObjectMatch<'a> {
    pub index: usize,
    pub details: &'a Value,
}

/// Find the first object in an ordered collection matching every given
/// `(field, value)` criterion. Deterministic: repeated calls on an
/// unchanged collection return the same position. No match is not an error
/// here; callers decide whether absence matters.
pub fn find_object<'a>(objects: &'a [Value], criteria: &[(&str, &str)]) -> Option<ObjectMatch<'a>> {
    objects.iter().enumerate().find_map(|(index, details)| {
        criteria
            .iter()
            .all(|(field, value)| details.get(field).and_then(Value::as_str) == Some(*value))
            .then_some(ObjectMatch { index, details })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn l3outs() -> Vec<Value> {
        vec![
            json!({"name": "l3out_0", "uuid": "u0"}),
            json!({"name": "l3out_1", "uuid": "u1"}),
            json!({"name": "l3out_1", "uuid": "u2"}),
        ]
    }

    #[test]
    fn test_find_by_uuid() {
        let objects = l3outs();
        let found = find_object(&objects, &[("uuid", "u1")]).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.details.get("name").unwrap(), "l3out_1");
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let objects = l3outs();
        let found = find_object(&objects, &[("name", "l3out_1")]).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.details.get("uuid").unwrap(), "u1");
    }

    #[test]
    fn test_no_match_is_none() {
        let objects = l3outs();
        assert!(find_object(&objects, &[("name", "missing")]).is_none());
        assert!(find_object(&[], &[("uuid", "u1")]).is_none());
    }

    #[test]
    fn test_repeated_lookup_is_deterministic() {
        let objects = l3outs();
        let first = find_object(&objects, &[("name", "l3out_1")]).unwrap().index;
        let second = find_object(&objects, &[("name", "l3out_1")]).unwrap().index;
        assert_eq!(first, second);
    }
}
