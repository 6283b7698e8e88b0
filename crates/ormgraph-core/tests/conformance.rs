use std::sync::Arc;
use std::thread;

use ormgraph_core::{
    env_model, parse_string, validate_project, EvalContext, Project, RecordSetVariant,
    ResolvedMember, ValidateOptions, ValueType,
};
use RecordSetVariant::*;

// ---------------------------------------------------------------------------
// Helper: project from (file, source) pairs in load order
// ---------------------------------------------------------------------------
fn project(sources: &[(&str, &str)]) -> Project {
    Project::new(
        sources
            .iter()
            .map(|(file, src)| parse_string(src, file))
            .collect(),
    )
}

fn chain_names(p: &Project, model: &str) -> Vec<String> {
    p.model_class(model)
        .ancestor_chain(&mut EvalContext::new())
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

const BASE: &str = r#"# Module: base

## res.country
- code: Char

## res.partner
> Contact
- name: Char
- email: Char
- country_id: Many2one(res.country)
- child_ids: One2many(res.partner)

## res.users
- login: Char
- partner_id: Many2one(res.partner)

### Delegates
- res.partner: partner_id
"#;

const MAIL: &str = r#"# Module: mail

## mail.thread
- message_ids: One2many(mail.message)
- message_post(self, body)

## mail.message
- body: Text

## : res.partner
- email: Text
- message_ids: One2many(mail.message)
"#;

const SALE: &str = r#"# Module: sale

## sale.order : mail.thread
- name: Char
- partner_id: Many2one(res.partner)
- order_line: One2many(sale.order.line)
- action_confirm(self)

## sale.order.line
- order_id: Many2one(sale.order)
- price_subtotal: Monetary
"#;

fn odoo() -> Project {
    project(&[
        ("base.models.md", BASE),
        ("mail.models.md", MAIL),
        ("sale.models.md", SALE),
    ])
}

// ===========================================================================
// Ancestors and member priority
// ===========================================================================

#[test]
fn ancestor_chain_includes_parent_chain() {
    let p = project(&[(
        "m.models.md",
        "## a\n## b : a\n## c : b\n## d : c, x\n## x : a",
    )]);
    let d = chain_names(&p, "d");
    assert_eq!(d[0], "d");
    for ancestor in chain_names(&p, "c") {
        assert!(d.contains(&ancestor), "{ancestor} missing from {d:?}");
    }
    assert_eq!(d, ["d", "c", "b", "a", "x"]);
}

#[test]
fn undeclared_parent_is_kept_in_chain() {
    let p = project(&[("m.models.md", "## a : p.missing\n- x: Char")]);
    let a = chain_names(&p, "a");
    for ancestor in chain_names(&p, "p.missing") {
        assert!(a.contains(&ancestor), "{ancestor} missing from {a:?}");
    }
    assert_eq!(a, ["a", "p.missing"]);

    let ty = p.model_type("a", Singleton).unwrap();
    let mut ctx = EvalContext::new();
    let supers: Vec<String> = ty
        .super_types(&mut ctx)
        .unwrap()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(supers, ["p.missing"]);
    assert!(ty.member_lookup("x", &mut ctx).unwrap().is_some());
}

#[test]
fn later_loaded_declaration_wins() {
    let p = odoo();
    let partner = p.model_type("res.partner", Singleton).unwrap();
    let member = partner
        .member_lookup("email", &mut EvalContext::new())
        .unwrap()
        .unwrap();
    assert_eq!(member.symbol().declaration().module, "mail");
    assert_eq!(
        partner
            .field_path_type("email", &mut EvalContext::new())
            .unwrap()
            .map(|t| t.to_string())
            .as_deref(),
        Some("str")
    );
}

#[test]
fn delegation_promotes_fields() {
    let p = odoo();
    let users = p.model_type("res.users", Singleton).unwrap();
    let mut ctx = EvalContext::new();
    match users.member_lookup("email", &mut ctx).unwrap() {
        Some(ResolvedMember::Delegated { symbol, via }) => {
            assert_eq!(via, "partner_id");
            assert_eq!(symbol.owner(), Some("res.partner"));
            // the in-place extension from mail overrides the base field
            assert_eq!(symbol.declaration().module, "mail");
        }
        other => panic!("expected delegated field, got {other:?}"),
    }
    let country = users
        .field_path_type("country_id", &mut ctx)
        .unwrap()
        .unwrap();
    assert_eq!(
        country,
        ValueType::Model(p.model_type("res.country", Singleton).unwrap())
    );
}

#[test]
fn identifier_segment_is_primitive() {
    let p = odoo();
    let order = p.model_type("sale.order", Singleton).unwrap();
    let mut ctx = EvalContext::new();
    let ty = order.field_path_type("partner_id.id", &mut ctx).unwrap();
    assert_eq!(ty.map(|t| t.to_string()).as_deref(), Some("int"));
    let ty = order
        .field_path_type("order_line.order_id.partner_id.country_id.code", &mut ctx)
        .unwrap();
    assert_eq!(ty.map(|t| t.to_string()).as_deref(), Some("str"));
}

#[test]
fn methods_keep_receiver_cardinality() {
    let p = odoo();
    let orders = env_model(&p, "sale.order").unwrap().to_collection_variant().unwrap();
    match orders
        .member_lookup("message_post", &mut EvalContext::new())
        .unwrap()
    {
        Some(ResolvedMember::Method(method)) => {
            assert!(Arc::ptr_eq(&method.receiver, &orders));
            assert_eq!(method.receiver.variant(), Collection);
        }
        other => panic!("expected method, got {other:?}"),
    }
}

// ===========================================================================
// Variants
// ===========================================================================

#[test]
fn canonical_identity_and_projections() {
    let p = odoo();
    let class = p.model_class("sale.order");
    let a = class.model_type(Collection).unwrap();
    let b = ormgraph_core::ModelType::create(&class, Collection).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let single = a.to_singleton_variant().unwrap();
    assert!(Arc::ptr_eq(&single, &single.to_singleton_variant().unwrap()));
    let item = a.iterated_item_type().unwrap().unwrap();
    assert!(Arc::ptr_eq(&item, &single));
}

// ===========================================================================
// Malformed input
// ===========================================================================

#[test]
fn mutual_extension_is_finite() {
    let p = project(&[("m.models.md", "## x : y\n- a: Char\n## y : x\n- b: Char")]);
    let names = chain_names(&p, "x");
    assert_eq!(names, ["x", "y"]);

    let x = p.model_type("x", Singleton).unwrap();
    let mut ctx = EvalContext::new();
    assert!(x.member_lookup("b", &mut ctx).unwrap().is_some());
    assert!(x.member_lookup("c", &mut ctx).unwrap().is_none());
    assert_eq!(x.completion_candidates(&mut ctx).unwrap().len(), 3);

    let result = validate_project(&p, &ValidateOptions::default());
    assert!(result.errors.iter().any(|e| e.code == "ORM-E006"));
}

#[test]
fn unknown_model_is_absent_not_error() {
    let p = odoo();
    let ghost = p.model_type("ghost.model", Singleton).unwrap();
    let mut ctx = EvalContext::new();
    assert!(ghost.member_lookup("name", &mut ctx).unwrap().is_none());
    assert!(ghost.field_path_type("name", &mut ctx).unwrap().is_none());
    let names: Vec<String> = ghost
        .completion_candidates(&mut ctx)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["id"]);
}

// ===========================================================================
// Invalidation
// ===========================================================================

#[test]
fn invalidation_makes_old_objects_stale() {
    let p = odoo();
    let class = p.model_class("sale.order");
    let ty = class.model_type(Singleton).unwrap();
    p.invalidate_all();

    let mut ctx = EvalContext::new();
    assert!(class.find_member("name", &mut ctx).unwrap_err().is_stale());
    assert!(ty.member_lookup("name", &mut ctx).unwrap_err().is_stale());
    assert!(ty.completion_candidates(&mut ctx).unwrap_err().is_stale());
    assert!(ty.call_result("browse").unwrap_err().is_stale());

    let fresh = p.model_type("sale.order", Singleton).unwrap();
    assert!(fresh.member_lookup("name", &mut ctx).unwrap().is_some());
}

#[test]
fn replaced_sources_are_visible_after_refetch() {
    let p = odoo();
    let before = p.model_type("sale.order", Singleton).unwrap();
    p.replace_modules(vec![parse_string(
        "## sale.order\n- note: Text",
        "sale.models.md",
    )]);
    assert!(!before.is_valid());

    let after = p.model_type("sale.order", Singleton).unwrap();
    let mut ctx = EvalContext::new();
    assert!(after.member_lookup("note", &mut ctx).unwrap().is_some());
    assert!(after.member_lookup("partner_id", &mut ctx).unwrap().is_none());
}

// ===========================================================================
// Concurrency
// ===========================================================================

#[test]
fn concurrent_first_access_agrees_on_canonical_types() {
    let p = Arc::new(odoo());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                let ty = p.model_type("res.users", Collection).unwrap();
                ty.completion_candidates(&mut EvalContext::new()).unwrap();
                ty
            })
        })
        .collect();
    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for ty in &types[1..] {
        assert!(Arc::ptr_eq(ty, &types[0]));
    }
}
