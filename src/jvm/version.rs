/// Version of the class file, which is used to verify that the JVM has the
/// necessary features to interpret the class
///
/// Ordering compares the major version first, so it matches the order in which the JVM releases
/// happened.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Version {
    pub major_version: u16,
    pub minor_version: u16,
}

impl Version {
    /// JVM class file version corresponding to Java SE 5 (released September 2004)
    pub const JAVA5: Version = Version::new(49);

    /// JVM class file version corresponding to Java SE 6 (released December 2006)
    pub const JAVA6: Version = Version::new(50);

    /// JVM class file version corresponding to Java SE 7 (released July 2011)
    pub const JAVA7: Version = Version::new(51);

    /// JVM class file version corresponding to Java SE 8 (released March 2014)
    pub const JAVA8: Version = Version::new(52);

    /// JVM class file version corresponding to Java SE 9 (released September 2017)
    pub const JAVA9: Version = Version::new(53);

    /// JVM class file version corresponding to Java SE 11 (released September 2018)
    pub const JAVA11: Version = Version::new(55);

    /// JVM class file version corresponding to Java SE 17 (released September 2021)
    pub const JAVA17: Version = Version::new(61);

    const fn new(major_version: u16) -> Version {
        Version {
            major_version,
            minor_version: 0,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major_version, self.minor_version)
    }
}
