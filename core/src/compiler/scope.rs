//! Function table and per-function local slots.

use hashbrown::HashMap;

use super::error::ErrorKind;
use super::labels::Label;
use crate::tree::{Callee, File, FuncDecl, Package, Param, Program, Type};

/// Table key of a declared function: `pkg.Name`, or `pkg.Type.Name` for methods.
pub fn decl_key(package: &str, decl: &FuncDecl) -> Result<String, ErrorKind> {
    match &decl.receiver {
        None => Ok(format!("{}.{}", package, decl.name)),
        Some(receiver) => {
            let type_name = receiver_type_name(receiver)?;
            Ok(format!("{}.{}.{}", package, type_name, decl.name))
        }
    }
}

fn receiver_type_name(receiver: &Param) -> Result<&str, ErrorKind> {
    match &receiver.ty {
        Type::Struct(s) => s
            .name
            .as_ref()
            .map(|n| n.name.as_str())
            .ok_or_else(|| ErrorKind::UnsupportedReceiver(receiver.ty.to_string())),
        other => Err(ErrorKind::UnsupportedReceiver(other.to_string())),
    }
}

/// Table key a call refers to, seen from `package`.
///
/// Method calls are keyed by the receiver's named struct type; `None` means
/// the receiver type cannot carry methods.
pub fn callee_key(package: &str, callee: &Callee) -> Option<String> {
    match callee {
        Callee::Func {
            package: qualifier,
            name,
        } => Some(format!(
            "{}.{}",
            qualifier.as_deref().unwrap_or(package),
            name
        )),
        Callee::Method { receiver, name } => {
            let type_name = receiver.ty.as_struct()?.name.as_ref()?;
            Some(format!("{}.{}.{}", type_name.package, type_name.name, name))
        }
    }
}

/// A function declaration together with where it was declared.
#[derive(Debug, Clone)]
pub struct DeclRef<'p> {
    pub key: String,
    pub package: &'p Package,
    pub file: &'p File,
    pub decl: &'p FuncDecl,
}

/// All declarations of `program`: packages in path order, then files, then
/// declaration order.
pub fn collect_decls(program: &Program) -> Result<Vec<DeclRef<'_>>, ErrorKind> {
    let mut decls = Vec::new();
    for package in program.sorted_packages() {
        for (file, decl) in package.funcs() {
            decls.push(DeclRef {
                key: decl_key(&package.name, decl)?,
                package,
                file,
                decl,
            });
        }
    }
    Ok(decls)
}

/// A declared function and its entry label.
#[derive(Debug, Clone)]
pub struct FuncInfo {
    pub label: Label,
    /// Interop stub: calls lower to a syscall or builtin, so the body is
    /// never compiled.
    pub external: bool,
}

/// Every function declared anywhere in the program, keyed by [`decl_key`].
///
/// All functions are registered before code generation starts so that
/// forward calls resolve to the same label as the eventual definition.
#[derive(Debug, Default)]
pub struct FuncTable {
    funcs: HashMap<String, FuncInfo>,
}

impl FuncTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, key: String, info: FuncInfo) -> Result<(), ErrorKind> {
        if self.funcs.contains_key(&key) {
            return Err(ErrorKind::DuplicateFunction(key));
        }
        self.funcs.insert(key, info);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FuncInfo> {
        self.funcs.get(key)
    }

}

/// Locals of the function being compiled.
///
/// Slots are handed out in first-use order and stay stable: declaring a
/// name again returns its existing slot.
#[derive(Debug, Default)]
pub struct FuncScope {
    locals: HashMap<String, usize>,
}

impl FuncScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_local(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.locals.get(name) {
            return slot;
        }
        let slot = self.locals.len();
        self.locals.insert(name.to_string(), slot);
        slot
    }

    pub fn load_local(&self, name: &str) -> Result<usize, ErrorKind> {
        self.locals
            .get(name)
            .copied()
            .ok_or_else(|| ErrorKind::UnknownLocal(name.to_string()))
    }

    pub fn num_locals(&self) -> usize {
        self.locals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::labels::LabelTable;
    use crate::tree::ExprKind;
    use crate::tree::builder::*;

    #[test]
    fn test_slots_are_stable() {
        let mut scope = FuncScope::new();
        assert_eq!(scope.new_local("a"), 0);
        assert_eq!(scope.new_local("b"), 1);
        assert_eq!(scope.new_local("a"), 0);
        assert_eq!(scope.load_local("b"), Ok(1));
        assert_eq!(
            scope.load_local("c"),
            Err(ErrorKind::UnknownLocal("c".into()))
        );
        assert_eq!(scope.num_locals(), 2);
    }

    #[test]
    fn test_keys() {
        let point = struct_type("geo", "Point", &[("X", Type::Int)]);
        let f = func("Add", vec![], vec![], vec![]);
        let m = method(param("p", point.clone()), "Len", vec![], vec![], vec![]);
        assert_eq!(decl_key("geo", &f).unwrap(), "geo.Add");
        assert_eq!(decl_key("geo", &m).unwrap(), "geo.Point.Len");

        let call = method_call(ident("p", point), "Len", vec![], Type::Int);
        let ExprKind::Call { callee, .. } = &call.kind else {
            unreachable!()
        };
        assert_eq!(callee_key("main", callee).as_deref(), Some("geo.Point.Len"));
    }

    #[test]
    fn test_non_struct_receiver() {
        let m = method(param("n", Type::Int), "Double", vec![], vec![], vec![]);
        assert_eq!(
            decl_key("main", &m),
            Err(ErrorKind::UnsupportedReceiver("int".into()))
        );
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut labels = LabelTable::new();
        let mut table = FuncTable::new();
        let info = FuncInfo {
            label: labels.new_label().unwrap(),
            external: false,
        };
        table.declare("main.F".into(), info.clone()).unwrap();
        assert_eq!(
            table.declare("main.F".into(), info),
            Err(ErrorKind::DuplicateFunction("main.F".into()))
        );
        assert!(table.get("main.F").is_some());
    }
}
