use crate::codegen::shared::binding::{BindError, BindOptions, Binding, Direction, FailureKind, go_imports};
use crate::decl::resolved::FieldType;
use crate::mapping::{AddressKind, TypeCategory};
use crate::naming::accessor_name;

/* Emits Go that reads request fields back into native values */
struct NativeEmitter<'a> {
  field: &'a str,
  options: &'a BindOptions,
  binding: Binding,
}

impl<'a> NativeEmitter<'a> {
  fn push(&mut self, statement: impl Into<String>) {
    self.binding.push(statement);
  }

  fn assign(&mut self, dst: &str, value: &str, declare_new: bool) {
    let op = if declare_new { ":=" } else { "=" };
    self.push(format!("{} {} {}", dst, op, value));
  }

  fn declare(&mut self, dst: &str, go_type: &str, declare_new: bool) {
    if declare_new {
      self.push(format!("var {} {}", dst, go_type));
    }
  }

  /* Import the package a spelled-out Go type is qualified with */
  fn import_type(&mut self, go_type: &str) {
    let name = go_type.trim_start_matches(['*', '[', ']']);
    let path = match name.split_once('.') {
      Some(("time", _)) => go_imports::TIME,
      Some(("sql", _)) => go_imports::SQL,
      Some(("uuid", _)) => go_imports::UUID,
      Some(("net", _)) => go_imports::NET,
      _ => return,
    };
    self.binding.import(path);
  }

  /* `err` is in scope; wrap it with the sentinel and return */
  fn invalid(&mut self, indent: &str) {
    self.binding.import(go_imports::FMT);
    self.binding.fail(FailureKind::InvalidField);
    let statement = format!(
      "{}err = fmt.Errorf(\"invalid {}: %s%w\", err.Error(), {})",
      indent, self.field, self.options.user_error_sentinel
    );
    self.push(statement);
    self.push(format!("{}{}", indent, self.options.error_return));
  }

  fn missing(&mut self, indent: &str) {
    self.binding.import(go_imports::FMT);
    self.binding.fail(FailureKind::MissingRequiredField);
    let statement =
      format!("{}err := fmt.Errorf(\"field {} is required%w\", {})", indent, self.field, self.options.user_error_sentinel);
    self.push(statement);
    self.push(format!("{}{}", indent, self.options.error_return));
  }

  /* `if v, err := parse(value); err != nil { ... } else { dst = v }` */
  fn parse_checked(&mut self, parser: &str, value: &str, dst: &str, indent: &str) {
    self.push(format!("{}if v, err := {}({}); err != nil {{", indent, parser, value));
    self.invalid(&format!("{}\t", indent));
    self.push(format!("{}}} else {{", indent));
    self.push(format!("{}\t{}", indent, dst));
    self.push(format!("{}}}", indent));
  }

  fn check_timestamp(&mut self, indent: &str) {
    self.push(format!("{}if err := v.CheckValid(); err != nil {{", indent));
    self.invalid(&format!("{}\t", indent));
    self.push(format!("{}}}", indent));
  }

  /// Single-value conversion expression, `None` for categories that need
  /// statements of their own.
  fn plain_conversion(category: &TypeCategory, value: &str) -> Option<String> {
    match category {
      TypeCategory::PlainScalar | TypeCategory::RawBytes | TypeCategory::Opaque => Some(value.to_string()),
      TypeCategory::NarrowInteger { native, .. } => Some(format!("{}({})", native, value)),
      TypeCategory::Aliased { original, .. } => Some(format!("{}({})", original, value)),
      _ => None,
    }
  }

  fn emit_single(&mut self, ty: &FieldType, getter: &str, dst: &str, declare_new: bool) -> Result<(), BindError> {
    match &ty.category {
      TypeCategory::NullableWrapper(kind) => {
        self.binding.import(go_imports::SQL);
        self.declare(dst, kind.native_type(), declare_new);
        self.push(format!("if v := {}; v != nil {{", getter));
        self.push(format!(
          "\t{} = {}{{Valid: true, {}: v.Value}}",
          dst,
          kind.native_type(),
          kind.payload_field()
        ));
        self.push("}");
      }
      TypeCategory::Temporal { nullable: true } => {
        self.binding.import(go_imports::SQL);
        self.declare(dst, "sql.NullTime", declare_new);
        self.push(format!("if v := {}; v != nil {{", getter));
        self.check_timestamp("\t");
        self.push("\tif t := v.AsTime(); !t.IsZero() {");
        self.push(format!("\t\t{}.Valid = true", dst));
        self.push(format!("\t\t{}.Time = t", dst));
        self.push("\t}");
        self.push("}");
      }
      TypeCategory::Temporal { nullable: false } => {
        if declare_new {
          self.binding.import(go_imports::TIME);
        }
        self.declare(dst, "time.Time", declare_new);
        self.push(format!("if v := {}; v != nil {{", getter));
        self.check_timestamp("\t");
        self.push(format!("\t{} = v.AsTime()", dst));
        self.push("} else {");
        self.missing("\t");
        self.push("}");
      }
      TypeCategory::Uuid => {
        self.binding.import(go_imports::UUID);
        self.declare(dst, "uuid.UUID", declare_new);
        self.parse_checked("uuid.Parse", getter, &format!("{} = v", dst), "");
      }
      TypeCategory::NetworkAddress(AddressKind::Mac) => {
        self.binding.import(go_imports::NET);
        self.declare(dst, "net.HardwareAddr", declare_new);
        self.parse_checked("net.ParseMAC", getter, &format!("{} = v", dst), "");
      }
      TypeCategory::NetworkAddress(AddressKind::Ip) => {
        /* An unparseable address binds as nil */
        self.binding.import(go_imports::NET);
        self.assign(dst, &format!("net.ParseIP({})", getter), declare_new);
      }
      TypeCategory::ExecResult => return Err(self.unsupported(ty)),
      category => {
        let value = Self::plain_conversion(category, getter).ok_or_else(|| self.unsupported(ty))?;
        self.assign(dst, &value, declare_new);
      }
    }
    Ok(())
  }

  fn emit_repeated(&mut self, ty: &FieldType, getter: &str, dst: &str, declare_new: bool) -> Result<(), BindError> {
    if ty.category.is_pass_through() {
      self.assign(dst, getter, declare_new);
      return Ok(());
    }

    let slice_type = format!("[]{}", ty.element);
    self.import_type(&slice_type);
    let make = format!("make({}, 0, len({}))", slice_type, getter);
    match &ty.category {
      TypeCategory::Uuid | TypeCategory::NetworkAddress(AddressKind::Mac) => {
        let parser = if ty.category == TypeCategory::Uuid {
          self.binding.import(go_imports::UUID);
          "uuid.Parse"
        } else {
          self.binding.import(go_imports::NET);
          "net.ParseMAC"
        };
        self.assign(dst, &make, declare_new);
        self.push(format!("for _, item := range {} {{", getter));
        self.parse_checked(parser, "item", &format!("{} = append({}, v)", dst, dst), "\t");
        self.push("}");
      }
      TypeCategory::NetworkAddress(AddressKind::Ip) => {
        self.binding.import(go_imports::NET);
        self.assign(dst, &make, declare_new);
        self.push(format!("for _, item := range {} {{", getter));
        self.push(format!("\t{} = append({}, net.ParseIP(item))", dst, dst));
        self.push("}");
      }
      TypeCategory::Temporal { nullable: false } => {
        self.assign(dst, &make, declare_new);
        self.push(format!("for _, v := range {} {{", getter));
        self.push("\tif v == nil {");
        self.missing("\t\t");
        self.push("\t}");
        self.check_timestamp("\t");
        self.push(format!("\t{} = append({}, v.AsTime())", dst, dst));
        self.push("}");
      }
      category => {
        let value = Self::plain_conversion(category, "item").ok_or_else(|| self.unsupported(ty))?;
        self.assign(dst, &make, declare_new);
        self.push(format!("for _, item := range {} {{", getter));
        self.push(format!("\t{} = append({}, {})", dst, dst, value));
        self.push("}");
      }
    }
    Ok(())
  }

  /* Absent wrappers and timestamps leave the pointer nil; scalars always bind */
  fn emit_pointer(&mut self, ty: &FieldType, getter: &str, dst: &str, declare_new: bool) -> Result<(), BindError> {
    if ty.repeated || ty.canonical.as_str().starts_with("**") {
      return Err(self.unsupported(ty));
    }
    if declare_new {
      self.import_type(&ty.element);
    }
    self.declare(dst, &format!("*{}", ty.element), declare_new);

    match &ty.category {
      TypeCategory::NullableWrapper(kind) => {
        self.binding.import(go_imports::SQL);
        self.push(format!("if v := {}; v != nil {{", getter));
        self.push(format!(
          "\t{} = &{}{{Valid: true, {}: v.Value}}",
          dst,
          kind.native_type(),
          kind.payload_field()
        ));
        self.push("}");
      }
      TypeCategory::Temporal { nullable } => {
        self.push(format!("if v := {}; v != nil {{", getter));
        self.check_timestamp("\t");
        if *nullable {
          self.binding.import(go_imports::SQL);
          self.push("\tif t := v.AsTime(); !t.IsZero() {");
          self.push(format!("\t\t{} = &sql.NullTime{{Valid: true, Time: t}}", dst));
          self.push("\t}");
        } else {
          self.push("\tt := v.AsTime()");
          self.push(format!("\t{} = &t", dst));
        }
        self.push("}");
      }
      TypeCategory::ExecResult => return Err(self.unsupported(ty)),
      _ => {
        let mut value = NativeEmitter {
          field: self.field,
          options: self.options,
          binding: Binding::new(self.field, Direction::ToNative, ty.wire.clone()),
        };
        value.emit_single(&ty.pointee(), getter, "value", true)?;
        self.push("{");
        for statement in value.binding.statements {
          self.push(format!("\t{}", statement));
        }
        self.push(format!("\t{} = &value", dst));
        self.push("}");
        self.binding.imports.extend(value.binding.imports);
        self.binding.failures.extend(value.binding.failures);
      }
    }
    Ok(())
  }

  fn unsupported(&self, ty: &FieldType) -> BindError {
    BindError::UnsupportedBinding {
      field: self.field.to_string(),
      declared: ty.declared.clone(),
      direction: Direction::ToNative,
    }
  }
}

/// Emit statements reading field `field` of the request message `src` into
/// the native target `dst`, declaring `dst` first when `declare_new` is set.
pub fn bind_to_native(
  field: &str,
  ty: &FieldType,
  src: &str,
  dst: &str,
  declare_new: bool,
  options: &BindOptions,
) -> Result<Binding, BindError> {
  let getter = format!("{}.Get{}()", src, accessor_name(field));
  let mut emitter = NativeEmitter { field, options, binding: Binding::new(field, Direction::ToNative, ty.wire.clone()) };

  if ty.pointer {
    emitter.emit_pointer(ty, &getter, dst, declare_new)?;
  } else if ty.repeated {
    emitter.emit_repeated(ty, &getter, dst, declare_new)?;
  } else {
    emitter.emit_single(ty, &getter, dst, declare_new)?;
  }

  if emitter.binding.can_fail() {
    if let Some(import) = &options.validation_import {
      emitter.binding.import(import);
    }
  }
  Ok(emitter.binding)
}
