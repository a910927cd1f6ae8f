//! Cache key names for the backend's list and detail resources

use std::fmt;

/// One logical backend resource; its string form is the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey<'a> {
    ClientsList,
    EmployeesList,
    EmployeeEntries(&'a str),
    EmployeeInfo(&'a str),
    ReceiptsList,
    ExpensesData,
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientsList => f.write_str("clients_list"),
            Self::EmployeesList => f.write_str("employees_list"),
            Self::EmployeeEntries(name) => write!(f, "employee_entries_{name}"),
            Self::EmployeeInfo(name) => write!(f, "employee_info_{name}"),
            Self::ReceiptsList => f.write_str("receipts_list"),
            Self::ExpensesData => f.write_str("expenses_data"),
        }
    }
}

impl From<CacheKey<'_>> for String {
    fn from(key: CacheKey<'_>) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CacheKey::ClientsList, "clients_list")]
    #[case(CacheKey::EmployeesList, "employees_list")]
    #[case(CacheKey::EmployeeEntries("Maria"), "employee_entries_Maria")]
    #[case(CacheKey::EmployeeInfo("Maria"), "employee_info_Maria")]
    #[case(CacheKey::ReceiptsList, "receipts_list")]
    #[case(CacheKey::ExpensesData, "expenses_data")]
    fn test_key_names(#[case] key: CacheKey<'_>, #[case] expected: &str) {
        assert_eq!(key.to_string(), expected);
        assert_eq!(String::from(key), expected);
    }

    #[test]
    fn test_per_employee_keys_are_distinct() {
        assert_ne!(
            CacheKey::EmployeeEntries("Ana").to_string(),
            CacheKey::EmployeeEntries("Bob").to_string()
        );
        assert_ne!(
            CacheKey::EmployeeEntries("Ana").to_string(),
            CacheKey::EmployeeInfo("Ana").to_string()
        );
    }
}
