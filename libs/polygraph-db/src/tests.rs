#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use sea_orm::sea_query::{Alias, Asterisk, Condition, PostgresQueryBuilder, Query};
    use serde_json::json;

    use search_core::{
        encode_cursor, Operator, OrderBy, OrderKey, Projection, SearchExpression, SortDir,
        ValueType,
    };

    use crate::{
        document, graph, object_store, relational, wide_column, AttributeKind, AttributeMap,
        Backend, CompileError,
    };

    fn attrs() -> AttributeMap {
        AttributeMap::from_definitions([
            ("id", "String"),
            ("age", "Int"),
            ("weight", "Float"),
            ("name", "String"),
            ("healthy", "Boolean"),
            ("born", "DateTime"),
            ("tags", "[String]"),
            ("scores", "[Int]"),
            ("props", "[String]"),
        ])
        .unwrap()
    }

    fn leaf(field: &str, op: Operator, raw: &str) -> SearchExpression {
        SearchExpression::leaf(field, op, raw, ValueType::Scalar)
    }

    fn list_leaf(field: &str, op: Operator, raw: &str) -> SearchExpression {
        SearchExpression::leaf(field, op, raw, ValueType::Array)
    }

    fn sql(condition: Condition) -> String {
        Query::select()
            .column(Asterisk)
            .from(Alias::new("records"))
            .cond_where(condition)
            .to_string(PostgresQueryBuilder)
    }

    /* ---------- attribute metadata ---------- */

    #[test]
    fn attribute_kinds_parse_model_notation() {
        assert_eq!(AttributeKind::parse("Int"), Some(AttributeKind::Int));
        assert_eq!(
            AttributeKind::parse("[String]"),
            Some(AttributeKind::Array(Box::new(AttributeKind::String)))
        );
        assert_eq!(AttributeKind::parse("Rainbow"), None);
        assert!(AttributeKind::parse("[String]").unwrap().is_array());
        assert_eq!(format!("{}", AttributeKind::parse("[Int]").unwrap()), "[Int]");
    }

    #[test]
    fn unknown_declared_type_is_an_error() {
        let err = AttributeMap::from_definitions([("color", "Rainbow")]).unwrap_err();
        assert!(matches!(err, CompileError::InvalidAttributeType { .. }));
    }

    /* ---------- relational ---------- */

    #[test]
    fn relational_comparisons() {
        let rendered = sql(relational::compile(&leaf("age", Operator::Gt, "30"), &attrs()).unwrap());
        assert!(rendered.contains(r#""age" > 30"#), "{rendered}");

        let rendered =
            sql(relational::compile(&leaf("name", Operator::Eq, "ada"), &attrs()).unwrap());
        assert!(rendered.contains(r#""name" = 'ada'"#), "{rendered}");
    }

    #[test]
    fn relational_empty_expression_is_always_true() {
        let rendered = sql(relational::compile(&SearchExpression::default(), &attrs()).unwrap());
        assert!(!rendered.contains("WHERE"), "{rendered}");
    }

    #[test]
    fn relational_in_list_and_empty_guard() {
        let rendered =
            sql(relational::compile(&list_leaf("name", Operator::In, "ada,tal"), &attrs()).unwrap());
        assert!(rendered.contains(r#""name" IN ('ada', 'tal')"#), "{rendered}");

        let empty = SearchExpression {
            field: Some("name".into()),
            value: Some(search_core::SearchValue::Many(Vec::new())),
            operator: Some(Operator::In),
            children: None,
        };
        let rendered = sql(relational::compile(&empty, &attrs()).unwrap());
        assert!(rendered.contains("1=0"), "{rendered}");
    }

    #[test]
    fn relational_case_fold_and_negation_modifiers() {
        let rendered =
            sql(relational::compile(&leaf("name", Operator::ILike, "A%"), &attrs()).unwrap());
        assert!(rendered.contains(r#"LOWER("name") LIKE 'a%'"#), "{rendered}");

        let rendered =
            sql(relational::compile(&leaf("name", Operator::NotLike, "a%"), &attrs()).unwrap());
        assert!(rendered.contains("NOT"), "{rendered}");
        assert!(rendered.contains(r#""name" LIKE 'a%'"#), "{rendered}");
    }

    #[test]
    fn relational_regex_operators() {
        let rendered =
            sql(relational::compile(&leaf("name", Operator::Regexp, "^a.*$"), &attrs()).unwrap());
        assert!(rendered.contains(r#""name" ~ '^a.*$'"#), "{rendered}");

        let rendered =
            sql(relational::compile(&leaf("name", Operator::IRegexp, "^a.*$"), &attrs()).unwrap());
        assert!(rendered.contains(r#""name" ~* '^a.*$'"#), "{rendered}");
    }

    #[test]
    fn relational_between_and_range_errors() {
        let rendered = sql(relational::compile(
            &list_leaf("age", Operator::Between, "18,30"),
            &attrs(),
        )
        .unwrap());
        assert!(rendered.contains(r#""age" BETWEEN 18 AND 30"#), "{rendered}");

        let err = relational::compile(&list_leaf("age", Operator::Between, "18"), &attrs())
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::RangeArity {
                field: "age".into(),
                operator: Operator::Between,
                backend: Backend::Relational,
            }
        );

        let err = relational::compile(&list_leaf("tags", Operator::Between, "a,b"), &attrs())
            .unwrap_err();
        assert!(matches!(err, CompileError::RangeOnArray { .. }));
    }

    #[test]
    fn relational_array_containment() {
        let rendered =
            sql(relational::compile(&leaf("tags", Operator::Contains, "x"), &attrs()).unwrap());
        assert!(rendered.contains(r#""tags" @> ARRAY['x']"#), "{rendered}");

        let rendered = sql(relational::compile(
            &leaf("name", Operator::Contains, "da"),
            &attrs(),
        )
        .unwrap());
        assert!(rendered.contains(r#""name" LIKE '%da%'"#), "{rendered}");
    }

    #[test]
    fn relational_combinators_and_scoped_children() {
        let expr = SearchExpression::any_of(vec![
            leaf("age", Operator::Gt, "30"),
            SearchExpression::all_of(vec![
                leaf("age", Operator::Eq, "30"),
                leaf("name", Operator::Ne, "ada"),
            ]),
        ]);
        let rendered = sql(relational::compile(&expr, &attrs()).unwrap());
        assert!(rendered.contains("OR"), "{rendered}");
        assert!(rendered.contains("AND"), "{rendered}");

        // field + children: children inherit the field
        let scoped = SearchExpression {
            field: Some("age".into()),
            value: None,
            operator: Some(Operator::Or),
            children: Some(vec![
                SearchExpression::new(None, Some("30"), ValueType::Scalar, Some(Operator::Gt), None),
                SearchExpression::new(None, Some("30"), ValueType::Scalar, Some(Operator::Eq), None),
            ]),
        };
        let rendered = sql(relational::compile(&scoped, &attrs()).unwrap());
        assert!(rendered.contains(r#""age" > 30"#), "{rendered}");
        assert!(rendered.contains(r#""age" = 30"#), "{rendered}");
    }

    #[test]
    fn relational_rejects_foreign_pseudo_operators() {
        let err = relational::compile(&leaf("id", Operator::Tgt, "b-3"), &attrs()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedOperator {
                operator: Operator::Tgt,
                backend: Backend::Relational,
            }
        );
    }

    #[test]
    fn relational_value_coercion_is_checked() {
        let err = relational::compile(&leaf("age", Operator::Eq, "abc"), &attrs()).unwrap_err();
        assert!(matches!(err, CompileError::ValueMismatch { .. }));

        let err = relational::compile(&leaf("ghost", Operator::Eq, "1"), &attrs()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownAttribute {
                field: "ghost".into()
            }
        );
    }

    /* ---------- document ---------- */

    #[test]
    fn document_comparisons_and_lists() {
        assert_eq!(
            document::compile(&leaf("age", Operator::Eq, "30"), &attrs()).unwrap(),
            json!({"age": {"$eq": 30}})
        );
        assert_eq!(
            document::compile(&list_leaf("name", Operator::NotIn, "ada,tal"), &attrs()).unwrap(),
            json!({"name": {"$nin": ["ada", "tal"]}})
        );
    }

    #[test]
    fn document_like_family_lowers_to_regex_with_options_flag() {
        assert_eq!(
            document::compile(&leaf("name", Operator::Like, "a_a%"), &attrs()).unwrap(),
            json!({"name": {"$regex": "^a.a.*$"}})
        );
        assert_eq!(
            document::compile(&leaf("name", Operator::ILike, "a%"), &attrs()).unwrap(),
            json!({"name": {"$regex": "^a.*$", "$options": "i"}})
        );
        assert_eq!(
            document::compile(&leaf("name", Operator::NotILike, "a%"), &attrs()).unwrap(),
            json!({"name": {"$not": {"$regex": "^a.*$", "$options": "i"}}})
        );
        assert_eq!(
            document::compile(&leaf("name", Operator::IRegexp, "ada"), &attrs()).unwrap(),
            json!({"name": {"$regex": "ada", "$options": "i"}})
        );
    }

    #[test]
    fn document_between_objects() {
        assert_eq!(
            document::compile(&list_leaf("age", Operator::Between, "18,30"), &attrs()).unwrap(),
            json!({"age": {"$gte": 18, "$lte": 30}})
        );
        assert_eq!(
            document::compile(&list_leaf("age", Operator::NotBetween, "18,30"), &attrs()).unwrap(),
            json!({"age": {"$not": {"$gte": 18, "$lte": 30}}})
        );
    }

    #[test]
    fn document_containment_is_exact_element_match() {
        assert_eq!(
            document::compile(&leaf("tags", Operator::Contains, "x"), &attrs()).unwrap(),
            json!({"tags": {"$eq": "x"}})
        );
        assert_eq!(
            document::compile(&leaf("scores", Operator::NotContains, "3"), &attrs()).unwrap(),
            json!({"scores": {"$ne": 3}})
        );
    }

    #[test]
    fn document_combinators() {
        let expr = SearchExpression::all_of(vec![
            leaf("age", Operator::Gte, "18"),
            SearchExpression::negation(leaf("name", Operator::Eq, "ada")),
        ]);
        assert_eq!(
            document::compile(&expr, &attrs()).unwrap(),
            json!({"$and": [
                {"age": {"$gte": 18}},
                {"$nor": [{"name": {"$eq": "ada"}}]},
            ]})
        );
    }

    #[test]
    fn document_scoped_children_inherit_the_field() {
        let scoped = SearchExpression {
            field: Some("age".into()),
            value: None,
            operator: Some(Operator::Or),
            children: Some(vec![
                SearchExpression::new(None, Some("30"), ValueType::Scalar, Some(Operator::Gt), None),
                SearchExpression::new(None, Some("30"), ValueType::Scalar, Some(Operator::Eq), None),
            ]),
        };
        assert_eq!(
            document::compile(&scoped, &attrs()).unwrap(),
            json!({"$or": [{"age": {"$gt": 30}}, {"age": {"$eq": 30}}]})
        );
    }

    #[test]
    fn document_rejects_wide_column_pseudo_operators() {
        let err = document::compile(&leaf("tags", Operator::Ctk, "x"), &attrs()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedOperator {
                operator: Operator::Ctk,
                backend: Backend::Document,
            }
        );
    }

    #[test]
    fn document_sort_appends_the_identifying_attribute() {
        let order = OrderBy(vec![OrderKey {
            field: "age".into(),
            dir: SortDir::Desc,
        }]);
        assert_eq!(
            document::sort_document(&order, "id"),
            json!({"age": -1, "id": 1})
        );
        assert_eq!(
            document::sort_document(&OrderBy::single("id", SortDir::Desc), "id"),
            json!({"id": -1})
        );
    }

    /* ---------- wide-column ---------- */

    #[test]
    fn wide_column_flat_conjunction() {
        let expr = SearchExpression::all_of(vec![
            leaf("age", Operator::Gt, "30"),
            leaf("name", Operator::Eq, "ada"),
        ]);
        assert_eq!(
            wide_column::compile(&expr, &attrs()).unwrap(),
            "age > 30 AND name = 'ada'"
        );
    }

    #[test]
    fn wide_column_rejects_or_and_not() {
        let expr = SearchExpression::any_of(vec![
            leaf("age", Operator::Gt, "30"),
            leaf("name", Operator::Eq, "ada"),
        ]);
        assert_eq!(
            wide_column::compile(&expr, &attrs()).unwrap_err(),
            CompileError::UnsupportedOperator {
                operator: Operator::Or,
                backend: Backend::WideColumn,
            }
        );

        let expr = SearchExpression::negation(leaf("age", Operator::Eq, "30"));
        assert!(matches!(
            wide_column::compile(&expr, &attrs()).unwrap_err(),
            CompileError::UnsupportedOperator {
                operator: Operator::Not,
                ..
            }
        ));

        // nested inside a flat and still raises
        let nested = SearchExpression::all_of(vec![SearchExpression::any_of(vec![leaf(
            "age",
            Operator::Eq,
            "30",
        )])]);
        assert!(wide_column::compile(&nested, &attrs()).is_err());
    }

    #[test]
    fn wide_column_minimal_operator_table() {
        assert_eq!(
            wide_column::compile(&leaf("tags", Operator::Contains, "x"), &attrs()).unwrap(),
            "tags CONTAINS 'x'"
        );
        assert_eq!(
            wide_column::compile(&leaf("props", Operator::Ctk, "color"), &attrs()).unwrap(),
            "props CONTAINS KEY 'color'"
        );
        assert_eq!(
            wide_column::compile(&list_leaf("age", Operator::In, "1,2,3"), &attrs()).unwrap(),
            "age IN (1, 2, 3)"
        );
        assert_eq!(
            wide_column::compile(&leaf("id", Operator::Tgt, "b-3"), &attrs()).unwrap(),
            "TOKEN(id) > TOKEN('b-3')"
        );
        assert_eq!(
            wide_column::compile(&leaf("id", Operator::Tget, "b-3"), &attrs()).unwrap(),
            "TOKEN(id) >= TOKEN('b-3')"
        );

        for op in [Operator::Ne, Operator::Like, Operator::Between] {
            let value = if op == Operator::Between { "1,2" } else { "x" };
            let expr = SearchExpression::leaf("name", op, value, ValueType::Scalar);
            assert!(
                matches!(
                    wide_column::compile(&expr, &attrs()),
                    Err(CompileError::UnsupportedOperator { .. })
                ),
                "{op} must be rejected"
            );
        }
    }

    #[test]
    fn wide_column_where_clause_wrapping() {
        let search = leaf("age", Operator::Gt, "30");
        assert_eq!(
            wide_column::where_clause(Some(&search), &attrs(), false).unwrap(),
            "WHERE age > 30"
        );
        assert_eq!(
            wide_column::where_clause(Some(&search), &attrs(), true).unwrap(),
            "WHERE age > 30 ALLOW FILTERING"
        );
        assert_eq!(wide_column::where_clause(None, &attrs(), true).unwrap(), "");
    }

    #[test]
    fn wide_column_token_cursor_grafting() {
        let mut record = Projection::new();
        record.insert("id".into(), json!("b-3"));
        let cursor = encode_cursor(&record, ["id"]);

        let grafted = wide_column::token_cursor_search(None, Some(&cursor), "id", false)
            .unwrap()
            .unwrap();
        assert_eq!(grafted.operator, Some(Operator::Tgt));
        assert_eq!(
            wide_column::compile(&grafted, &attrs()).unwrap(),
            "TOKEN(id) > TOKEN('b-3')"
        );

        let base = leaf("age", Operator::Gt, "30");
        let merged = wide_column::token_cursor_search(Some(&base), Some(&cursor), "id", true)
            .unwrap()
            .unwrap();
        assert_eq!(
            wide_column::compile(&merged, &attrs()).unwrap(),
            "age > 30 AND TOKEN(id) >= TOKEN('b-3')"
        );

        // cursor without the identifying attribute degrades to the search
        let empty = encode_cursor(&Projection::new(), ["id"]);
        let kept = wide_column::token_cursor_search(Some(&base), Some(&empty), "id", false)
            .unwrap()
            .unwrap();
        assert_eq!(kept, base);
    }

    /* ---------- object store ---------- */

    #[test]
    fn object_store_fragments() {
        assert_eq!(
            object_store::compile(&leaf("age", Operator::Gte, "18"), &attrs()).unwrap(),
            r#"s."age" >= 18"#
        );
        assert_eq!(
            object_store::compile(&leaf("name", Operator::Like, "a_%"), &attrs()).unwrap(),
            r#"s."name" LIKE 'a_%'"#
        );
        assert_eq!(
            object_store::compile(&leaf("name", Operator::ILike, "A%"), &attrs()).unwrap(),
            r#"LOWER(s."name") LIKE LOWER('A%')"#
        );
        assert_eq!(
            object_store::compile(&list_leaf("age", Operator::Between, "18,30"), &attrs())
                .unwrap(),
            r#"s."age" BETWEEN 18 AND 30"#
        );
        assert_eq!(
            object_store::compile(&list_leaf("name", Operator::NotIn, "ada,tal"), &attrs())
                .unwrap(),
            r#"s."name" NOT IN ('ada', 'tal')"#
        );
    }

    #[test]
    fn object_store_combinators_parenthesize() {
        let expr = SearchExpression::any_of(vec![
            leaf("age", Operator::Gt, "30"),
            leaf("name", Operator::Eq, "ada"),
        ]);
        assert_eq!(
            object_store::compile(&expr, &attrs()).unwrap(),
            r#"(s."age" > 30 OR s."name" = 'ada')"#
        );

        let negated = SearchExpression::negation(leaf("age", Operator::Eq, "30"));
        assert_eq!(
            object_store::compile(&negated, &attrs()).unwrap(),
            r#"NOT (s."age" = 30)"#
        );
    }

    #[test]
    fn object_store_serialized_array_containment() {
        assert_eq!(
            object_store::compile(&leaf("tags", Operator::Contains, "x"), &attrs()).unwrap(),
            r#"(s."tags" LIKE '["x",%' OR s."tags" LIKE '%,"x",%' OR s."tags" LIKE '%,"x"]')"#
        );
        assert_eq!(
            object_store::compile(&leaf("scores", Operator::Contains, "3"), &attrs()).unwrap(),
            r#"(s."scores" LIKE '[3,%' OR s."scores" LIKE '%,3,%' OR s."scores" LIKE '%,3]')"#
        );
        let negated =
            object_store::compile(&leaf("tags", Operator::NotContains, "x"), &attrs()).unwrap();
        assert!(negated.starts_with("NOT ("), "{negated}");
    }

    #[test]
    fn object_store_has_no_regex() {
        assert_eq!(
            object_store::compile(&leaf("name", Operator::Regexp, "^a"), &attrs()).unwrap_err(),
            CompileError::UnsupportedOperator {
                operator: Operator::Regexp,
                backend: Backend::ObjectStore,
            }
        );
    }

    /* ---------- graph ---------- */

    #[test]
    fn graph_fragments() {
        assert_eq!(
            graph::compile(&leaf("age", Operator::Eq, "30"), &attrs()).unwrap(),
            "n.age = 30"
        );
        assert_eq!(
            graph::compile(&leaf("name", Operator::Ne, "ada"), &attrs()).unwrap(),
            "n.name <> 'ada'"
        );
        assert_eq!(
            graph::compile(&list_leaf("name", Operator::In, "ada,tal"), &attrs()).unwrap(),
            "n.name IN ['ada', 'tal']"
        );
        assert_eq!(
            graph::compile(&list_leaf("age", Operator::Between, "18,30"), &attrs()).unwrap(),
            "(n.age >= 18 AND n.age <= 30)"
        );
    }

    #[test]
    fn graph_like_family_uses_regex_matching() {
        assert_eq!(
            graph::compile(&leaf("name", Operator::Like, "a_%"), &attrs()).unwrap(),
            "n.name =~ '^a..*$'"
        );
        assert_eq!(
            graph::compile(&leaf("name", Operator::ILike, "a%"), &attrs()).unwrap(),
            "n.name =~ '(?i)^a.*$'"
        );
        assert_eq!(
            graph::compile(&leaf("name", Operator::NotRegexp, "^a"), &attrs()).unwrap(),
            "NOT (n.name =~ '^a')"
        );
    }

    #[test]
    fn graph_containment() {
        assert_eq!(
            graph::compile(&leaf("name", Operator::Contains, "da"), &attrs()).unwrap(),
            "(n.name CONTAINS 'da')"
        );
        assert_eq!(
            graph::compile(&leaf("tags", Operator::Contains, "x"), &attrs()).unwrap(),
            r#"(n.tags STARTS WITH '["x",' OR n.tags CONTAINS ',"x",' OR n.tags ENDS WITH ',"x"]')"#
        );
    }

    #[test]
    fn graph_combinators() {
        let expr = SearchExpression::all_of(vec![
            leaf("age", Operator::Gte, "18"),
            SearchExpression::negation(leaf("name", Operator::Eq, "ada")),
        ]);
        assert_eq!(
            graph::compile(&expr, &attrs()).unwrap(),
            "(n.age >= 18 AND NOT (n.name = 'ada'))"
        );
    }

    /* ---------- shared skeleton ---------- */

    #[test]
    fn every_backend_compiles_the_empty_node_to_always_true() {
        let empty = SearchExpression::default();
        let map = attrs();
        assert!(!sql(relational::compile(&empty, &map).unwrap()).contains("WHERE"));
        assert_eq!(document::compile(&empty, &map).unwrap(), json!({}));
        assert_eq!(wide_column::compile(&empty, &map).unwrap(), "");
        assert_eq!(object_store::compile(&empty, &map).unwrap(), "");
        assert_eq!(graph::compile(&empty, &map).unwrap(), "");
    }

    #[test]
    fn missing_operator_is_the_empty_predicate_not_an_error() {
        let no_op = SearchExpression {
            field: Some("age".into()),
            value: Some(search_core::SearchValue::One("30".into())),
            operator: None,
            children: None,
        };
        assert_eq!(document::compile(&no_op, &attrs()).unwrap(), json!({}));
    }
}
