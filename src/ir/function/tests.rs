use pretty_assertions::assert_eq;

use super::*;

#[test]
fn descriptor_flags() {
    let plain = FunctionDescriptor::new("integer");
    assert_eq!(plain.name(), "integer");
    assert!(plain.is_implemented());
    assert!(!plain.is_parameter_settable());

    let settable = FunctionDescriptor::new("decimal").parameter_settable();
    assert!(settable.is_parameter_settable());

    let stub = FunctionDescriptor::new("datetime").without_implementation();
    assert!(!stub.is_implemented());
}

#[test]
fn registry_lookup_and_call() {
    let functions = Functions::new().with(FunctionDescriptor::new("string"));
    let descriptor = functions.lookup("string").unwrap();
    assert_eq!(descriptor.name(), "string");
    assert_eq!(
        descriptor.call(vec![ScalarExpr::column(0, Type::Integer)], Type::String),
        ScalarExpr::FunctionCall {
            name: "string".into(),
            args: vec![ScalarExpr::column(0, Type::Integer)],
            func_type: Type::String,
        },
    );
    assert!(functions.lookup("blob").is_none());
}
