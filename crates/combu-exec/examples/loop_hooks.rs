use combu_core::{CombuError, ParamSpec, Record};
use combu_exec::Combu;

fn show(label: &'static str) -> impl FnMut(&Record) -> Result<(), CombuError> {
    move |record| {
        println!("[{label}] {}", record.to_value());
        Ok(())
    }
}

fn main() -> Result<(), CombuError> {
    let mut combu = Combu::new(|record: &Record| -> Result<String, CombuError> {
        Ok(format!("{}", record.to_value()))
    });
    combu
        .set_before("v1", show("before v1"))
        .set_before_each("v1", show("before_each v1"))
        .set_after_each("v1", show("after_each v1"))
        .set_after("v1", show("after v1"));

    let spec = ParamSpec::new().with("v1", [1, 2]).with("v2", ["a", "b"]);
    for outcome in combu.execute(&spec)? {
        let (result, _) = outcome?;
        println!("{result}");
    }
    Ok(())
}
