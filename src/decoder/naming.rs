/// Значение считается заданным, если строка не пустая
pub fn is_present(value: &str) -> bool {
    !value.is_empty()
}

/// Дописывает к имени пользовательское имя в скобках и описание в
/// квадратных скобках, если они заданы: `PDU1 (Rack3) [Main feed]`
pub fn compose(base: impl Into<String>, custom_name: &str, description: &str) -> String {
    let mut name = base.into();
    if is_present(custom_name) {
        name.push_str(&format!(" ({})", custom_name));
    }
    if is_present(description) {
        name.push_str(&format!(" [{}]", description));
    }
    name
}
