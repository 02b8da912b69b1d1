//! Simulated host loader driving a guard the way a real interception
//! adapter would: it keeps a live frame stack, builds caller chains with
//! `ChainBuilder`, and wraps every load in `Guard::intercept`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use import_guard::descriptor::MODULE_LEVEL;
use import_guard::{
    ChainBuilder, ComponentIndex, Guard, ImportDescriptor, RawFrame, Result, resolve_relative,
};

#[derive(Debug, Clone)]
pub enum Stmt {
    Import {
        line: u32,
        name: String,
        level: u32,
        sub_names: Vec<String>,
    },
    Call {
        line: u32,
        module: String,
        function: String,
    },
}

impl Stmt {
    pub fn import(line: u32, name: &str) -> Self {
        Self::Import {
            line,
            name: name.to_string(),
            level: 0,
            sub_names: Vec::new(),
        }
    }

    pub fn from_import(line: u32, name: &str, level: u32, sub_names: &[&str]) -> Self {
        Self::Import {
            line,
            name: name.to_string(),
            level,
            sub_names: sub_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn call(line: u32, module: &str, function: &str) -> Self {
        Self::Call {
            line,
            module: module.to_string(),
            function: function.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    line: u32,
    body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Module {
    path: String,
    file: String,
    is_package: bool,
    body: Vec<Stmt>,
    functions: HashMap<String, Function>,
}

impl Module {
    pub fn new(path: &str, file: &str) -> Self {
        Self {
            path: path.to_string(),
            file: file.to_string(),
            is_package: false,
            body: Vec::new(),
            functions: HashMap::new(),
        }
    }

    pub fn package(mut self) -> Self {
        self.is_package = true;
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }

    pub fn function(mut self, name: &str, line: u32, body: Vec<Stmt>) -> Self {
        self.functions
            .insert(name.to_string(), Function { line, body });
        self
    }
}

pub const DRIVER_FILE: &str = "tests/test_app.py";

pub struct SimulatedHost {
    guard: Arc<Guard>,
    builder: ChainBuilder,
    index: ComponentIndex,
    modules: HashMap<String, Module>,
    loaded: HashSet<String>,
    /// Outermost first.
    stack: Vec<RawFrame>,
}

impl SimulatedHost {
    pub fn new(guard: Arc<Guard>, builder: ChainBuilder) -> Self {
        Self {
            guard,
            builder,
            index: ComponentIndex::new(),
            modules: HashMap::new(),
            loaded: HashSet::new(),
            stack: Vec::new(),
        }
    }

    pub fn add(&mut self, module: Module) {
        self.modules.insert(module.path.clone(), module);
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded.contains(path)
    }

    /// `import name` issued from a test function outside the project.
    pub fn run_import(&mut self, name: &str) -> Result<()> {
        self.with_frame(RawFrame::new(DRIVER_FILE, 1, "test_app"), |host| {
            host.import(name, &[], 0, "")
        })
    }

    /// `module.function()` issued from a test function outside the project.
    pub fn run_call(&mut self, module: &str, function: &str) -> Result<()> {
        self.with_frame(RawFrame::new(DRIVER_FILE, 2, "test_app"), |host| {
            host.call(module, function)
        })
    }

    fn with_frame<T>(
        &mut self,
        frame: RawFrame,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.stack.push(frame);
        let result = f(self);
        self.stack.pop();
        result
    }

    fn set_line(&mut self, line: u32) {
        if let Some(top) = self.stack.last_mut() {
            top.line = line;
        }
    }

    fn package_of(&self, module: &str) -> String {
        match self.modules.get(module) {
            Some(m) if m.is_package => module.to_string(),
            _ => module
                .rsplit_once('.')
                .map(|(parent, _)| parent.to_string())
                .unwrap_or_default(),
        }
    }

    fn exec(&mut self, body: &[Stmt], module: &str) -> Result<()> {
        for stmt in body {
            match stmt {
                Stmt::Import {
                    line,
                    name,
                    level,
                    sub_names,
                } => {
                    self.set_line(*line);
                    let package = self.package_of(module);
                    self.import(name, sub_names, *level, &package)?;
                }
                Stmt::Call {
                    line,
                    module: target,
                    function,
                } => {
                    self.set_line(*line);
                    self.call(target, function)?;
                }
            }
        }
        Ok(())
    }

    fn call(&mut self, module: &str, function: &str) -> Result<()> {
        let (file, Function { line, body }) = {
            let m = &self.modules[module];
            (m.file.clone(), m.functions[function].clone())
        };
        self.with_frame(RawFrame::new(file, line, function), |host| {
            host.exec(&body, module)
        })
    }

    fn import(
        &mut self,
        name: &str,
        sub_names: &[String],
        level: u32,
        package: &str,
    ) -> Result<()> {
        let full = resolve_relative(name, package, level)?;
        let descriptor = ImportDescriptor::new(full.clone())
            .with_sub_names(sub_names.iter().map(String::as_str))
            .with_relative_level(level);

        let innermost: Vec<RawFrame> = self.stack.iter().rev().cloned().collect();
        let chain = self.builder.build(&innermost, &self.index);

        let guard = Arc::clone(&self.guard);
        guard.intercept(&descriptor, &chain, || self.load(&full))
    }

    fn load(&mut self, path: &str) -> Result<()> {
        if self.loaded.contains(path) {
            return Ok(());
        }
        if let Some((parent, _)) = path.rsplit_once('.') {
            self.load(parent)?;
        }

        let (file, body) = match self.modules.get(path) {
            Some(m) => (m.file.clone(), m.body.clone()),
            None => (format!("<stdlib>/{}.py", path), Vec::new()),
        };
        self.loaded.insert(path.to_string());
        self.index.register(path, file.clone());

        let result = self.with_frame(RawFrame::new(file, 0, MODULE_LEVEL), |host| {
            host.exec(&body, path)
        });
        if result.is_err() {
            self.loaded.remove(path);
        }
        result
    }
}
