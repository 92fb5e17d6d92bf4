use crate::codegen::shared::binding::{BindError, BindOptions, Binding, Direction, go_imports};
use crate::decl::resolved::FieldType;
use crate::mapping::TypeCategory;

/// Conversion expression for a single non-nullable value, `None` when the
/// category needs guarded statements instead.
fn wire_value(category: &TypeCategory, value: &str, binding: &mut Binding) -> Option<String> {
  match category {
    TypeCategory::PlainScalar | TypeCategory::RawBytes | TypeCategory::Opaque => Some(value.to_string()),
    TypeCategory::Temporal { nullable: false } => {
      binding.import(go_imports::TIMESTAMPPB);
      Some(format!("timestamppb.New({})", value))
    }
    TypeCategory::Uuid | TypeCategory::NetworkAddress(_) => Some(format!("{}.String()", value)),
    TypeCategory::NarrowInteger { wire, .. } => Some(format!("{}({})", wire, value)),
    TypeCategory::Aliased { element, .. } => Some(format!("{}({})", element, value)),
    TypeCategory::NullableWrapper(_) | TypeCategory::Temporal { nullable: true } | TypeCategory::ExecResult => None,
  }
}

/// Emit statements copying the native value `src` into the wire field `dst`.
pub fn bind_to_wire(
  field: &str,
  ty: &FieldType,
  src: &str,
  dst: &str,
  options: &BindOptions,
) -> Result<Binding, BindError> {
  let mut binding = Binding::new(field, Direction::ToWire, ty.wire.clone());
  let unsupported = || BindError::UnsupportedBinding {
    field: field.to_string(),
    declared: ty.declared.clone(),
    direction: Direction::ToWire,
  };

  if ty.pointer {
    /* Repeated wire values cannot carry nil elements */
    if ty.repeated || ty.canonical.as_str().starts_with("**") {
      return Err(unsupported());
    }
    let inner = bind_to_wire(field, &ty.pointee(), "v", dst, options)?;
    binding.push(format!("if {} != nil {{", src));
    binding.push(format!("\tv := *{}", src));
    for statement in inner.statements {
      binding.push(format!("\t{}", statement));
    }
    binding.push("}");
    binding.imports.extend(inner.imports);
    return Ok(binding);
  }

  if ty.repeated {
    if ty.category.is_pass_through() {
      binding.push(format!("{} = {}", dst, src));
      return Ok(binding);
    }
    let value = wire_value(&ty.category, "v", &mut binding).ok_or_else(unsupported)?;
    binding.push(format!("for _, v := range {} {{", src));
    binding.push(format!("\t{} = append({}, {})", dst, dst, value));
    binding.push("}");
    return Ok(binding);
  }

  match &ty.category {
    TypeCategory::NullableWrapper(kind) => {
      binding.import(go_imports::WRAPPERSPB);
      binding.push(format!("if {}.Valid {{", src));
      binding.push(format!("\t{} = {}({}.{})", dst, kind.wire_constructor(), src, kind.payload_field()));
      binding.push("}");
    }
    TypeCategory::Temporal { nullable: true } => {
      binding.import(go_imports::TIMESTAMPPB);
      binding.push(format!("if {}.Valid {{", src));
      binding.push(format!("\t{} = timestamppb.New({}.Time)", dst, src));
      binding.push("}");
    }
    TypeCategory::ExecResult => {
      binding.push(format!("{} = new({}.ExecResult)", dst, options.wire_package));
      for accessor in ["LastInsertId", "RowsAffected"] {
        binding.push(format!("if {}.{}, err = {}.{}(); err != nil {{", dst, accessor, src, accessor));
        binding.push(format!("\t{}", options.error_return));
        binding.push("}");
      }
    }
    category => {
      let value = wire_value(category, src, &mut binding).ok_or_else(unsupported)?;
      binding.push(format!("{} = {}", dst, value));
    }
  }

  Ok(binding)
}
