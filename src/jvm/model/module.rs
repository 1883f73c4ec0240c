use super::{ClassVisitor, ModuleVisitor};
use crate::jvm::{
    Error, ExportsAccessFlags, Feature, ModuleAccessFlags, RequiresAccessFlags, Version,
};

/// Dependency of a module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRequireNode {
    pub module: String,
    pub access_flags: RequiresAccessFlags,

    /// Version of the dependency at compile time
    pub version: Option<String>,
}

/// Package exported by a module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleExportNode {
    pub package: String,
    pub access_flags: ExportsAccessFlags,

    /// Modules the package is exported to (all modules if empty)
    pub modules: Vec<String>,
}

/// Package opened by a module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleOpenNode {
    pub package: String,
    pub access_flags: ExportsAccessFlags,

    /// Modules the package is open to (all modules if empty)
    pub modules: Vec<String>,
}

/// Service implementations provided by a module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleProvideNode {
    pub service: String,
    pub providers: Vec<String>,
}

/// Module declaration (`Module` attribute and friends)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleNode {
    pub name: String,
    pub access_flags: ModuleAccessFlags,
    pub version: Option<String>,
    pub main_class: Option<String>,
    pub packages: Vec<String>,
    pub requires: Vec<ModuleRequireNode>,
    pub exports: Vec<ModuleExportNode>,
    pub opens: Vec<ModuleOpenNode>,

    /// Internal names of the services used
    pub uses: Vec<String>,

    pub provides: Vec<ModuleProvideNode>,
}

impl ModuleNode {
    pub fn new(
        name: impl Into<String>,
        access_flags: ModuleAccessFlags,
        version: Option<String>,
    ) -> ModuleNode {
        ModuleNode {
            name: name.into(),
            access_flags,
            version,
            main_class: None,
            packages: vec![],
            requires: vec![],
            exports: vec![],
            opens: vec![],
            uses: vec![],
            provides: vec![],
        }
    }

    /// Declare the module on a class visitor and replay it there
    pub fn accept(&self, visitor: &mut (impl ClassVisitor + ?Sized)) -> Result<(), Error> {
        let module_visitor =
            visitor.visit_module(&self.name, self.access_flags, self.version.as_deref())?;
        match module_visitor {
            Some(module_visitor) => self.accept_module(module_visitor),
            None => Ok(()),
        }
    }

    pub fn accept_module(&self, visitor: &mut (impl ModuleVisitor + ?Sized)) -> Result<(), Error> {
        if let Some(main_class) = &self.main_class {
            visitor.visit_main_class(main_class)?;
        }
        for package in &self.packages {
            visitor.visit_package(package)?;
        }
        for require in &self.requires {
            visitor.visit_require(
                &require.module,
                require.access_flags,
                require.version.as_deref(),
            )?;
        }
        for export in &self.exports {
            visitor.visit_export(&export.package, export.access_flags, &export.modules)?;
        }
        for open in &self.opens {
            visitor.visit_open(&open.package, open.access_flags, &open.modules)?;
        }
        for service in &self.uses {
            visitor.visit_use(service)?;
        }
        for provide in &self.provides {
            visitor.visit_provide(&provide.service, &provide.providers)?;
        }
        visitor.visit_end()
    }

    pub fn check(&self, target: Version) -> Result<(), Error> {
        Feature::Modules.check(target)
    }
}

impl ModuleVisitor for ModuleNode {
    fn visit_main_class(&mut self, main_class: &str) -> Result<(), Error> {
        self.main_class = Some(String::from(main_class));
        Ok(())
    }

    fn visit_package(&mut self, package: &str) -> Result<(), Error> {
        self.packages.push(String::from(package));
        Ok(())
    }

    fn visit_require(
        &mut self,
        module: &str,
        access_flags: RequiresAccessFlags,
        version: Option<&str>,
    ) -> Result<(), Error> {
        self.requires.push(ModuleRequireNode {
            module: String::from(module),
            access_flags,
            version: version.map(String::from),
        });
        Ok(())
    }

    fn visit_export(
        &mut self,
        package: &str,
        access_flags: ExportsAccessFlags,
        modules: &[String],
    ) -> Result<(), Error> {
        self.exports.push(ModuleExportNode {
            package: String::from(package),
            access_flags,
            modules: modules.to_vec(),
        });
        Ok(())
    }

    fn visit_open(
        &mut self,
        package: &str,
        access_flags: ExportsAccessFlags,
        modules: &[String],
    ) -> Result<(), Error> {
        self.opens.push(ModuleOpenNode {
            package: String::from(package),
            access_flags,
            modules: modules.to_vec(),
        });
        Ok(())
    }

    fn visit_use(&mut self, service: &str) -> Result<(), Error> {
        self.uses.push(String::from(service));
        Ok(())
    }

    fn visit_provide(&mut self, service: &str, providers: &[String]) -> Result<(), Error> {
        self.provides.push(ModuleProvideNode {
            service: String::from(service),
            providers: providers.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn replay_into_another_module() {
        let mut module = ModuleNode::new("com.example.app", ModuleAccessFlags::OPEN, None);
        module.visit_main_class("com/example/app/Main").unwrap();
        module
            .visit_require("java.base", RequiresAccessFlags::MANDATED, Some("17"))
            .unwrap();
        module
            .visit_export(
                "com/example/app/api",
                ExportsAccessFlags::empty(),
                &[String::from("com.example.client")],
            )
            .unwrap();
        module.visit_use("com/example/app/spi/Plugin").unwrap();
        module
            .visit_provide(
                "com/example/app/spi/Plugin",
                &[String::from("com/example/app/DefaultPlugin")],
            )
            .unwrap();

        let mut copy = ModuleNode::new("com.example.app", ModuleAccessFlags::OPEN, None);
        module.accept_module(&mut copy).unwrap();
        assert_eq!(copy, module);

        assert!(module.check(Version::JAVA8).is_err());
        assert!(module.check(Version::JAVA9).is_ok());
    }
}
