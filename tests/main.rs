use assert_cmd::Command;
use predicates::prelude::*;

struct CLI {
    home: tempfile::TempDir,
}

impl CLI {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    // The default data directory for commands run by this CLI.
    fn data_dir(&self) -> std::path::PathBuf {
        self.home.path().join("data").join("invoicer")
    }

    fn write(&self, file: &str, content: &str) {
        std::fs::create_dir_all(self.data_dir()).unwrap();
        std::fs::write(self.data_dir().join(file), content).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("invoicer").unwrap();
        cmd.env("XDG_DATA_HOME", self.home.path().join("data"));
        cmd.env("XDG_CONFIG_HOME", self.home.path().join("config"));
        cmd.env_remove("INVOICER_CONFIG");
        cmd.env_remove("INVOICER_DATA_DIR");
        cmd.env_remove("INVOICER_BIND");
        cmd
    }
}

fn matches(pattern: &str) -> predicates::str::RegexPredicate {
    predicates::str::is_match(pattern).unwrap()
}

#[test]
fn test_list_empty() {
    let cli = CLI::new();

    cli.cmd()
        .args(["list", "invoices"])
        .assert()
        .success()
        .stdout("No invoices found\n");
}

#[test]
fn test_list_products() {
    let cli = CLI::new();
    cli.write(
        "products.json",
        r#"[
            {"id": 1, "name": "Oats", "price": 4.5, "categoryId": 2},
            {"id": 3, "name": "Banana", "description": "yellow", "price": 0.25}
        ]"#,
    );

    cli.cmd()
        .args(["list", "products"])
        .assert()
        .success()
        .stdout(matches(r"1.*Oats.*4\.50.*2"))
        .stdout(matches(r"3.*Banana.*yellow.*0\.25"));
}

#[test]
fn test_list_invoices() {
    let cli = CLI::new();
    cli.write(
        "invoices.json",
        r#"[{
            "id": 7,
            "customerId": 4,
            "items": [
                {"productId": 1, "quantity": 3, "price": 10, "discount": 2},
                {"productId": 2, "quantity": 1, "price": 5}
            ],
            "totalAmount": 29,
            "tax": 2.9,
            "finalAmount": 31.9,
            "paymentOption": "card",
            "invoiceDate": "2024-07-01"
        }]"#,
    );

    cli.cmd()
        .args(["list", "invoices"])
        .assert()
        .success()
        .stdout(matches(r"7.*4.*2.*29\.00.*0\.00.*2\.90.*31\.90.*card.*2024-07-01"));
}

#[test]
fn test_list_data_dir_flag() {
    let cli = CLI::new();
    let other = tempfile::tempdir().unwrap();
    std::fs::write(
        other.path().join("categories.json"),
        r#"[{"id": 1, "name": "Tools"}]"#,
    )
    .unwrap();

    cli.cmd()
        .arg("--data-dir")
        .arg(other.path())
        .args(["list", "categories"])
        .assert()
        .success()
        .stdout(matches("Tools"));
}

#[test]
fn test_list_data_dir_from_config() {
    let cli = CLI::new();
    let other = tempfile::tempdir().unwrap();
    std::fs::write(
        other.path().join("customers.json"),
        r#"[{"id": 1, "name": "Ada", "email": "ada@example.com"}]"#,
    )
    .unwrap();
    let config = cli.home.path().join("config").join("invoicer");
    std::fs::create_dir_all(&config).unwrap();
    std::fs::write(
        config.join("config.ini"),
        format!("[storage]\ndata_dir = {}\n", other.path().display()),
    )
    .unwrap();

    cli.cmd()
        .args(["list", "customers"])
        .assert()
        .success()
        .stdout(matches("Ada.*ada@example.com"));
}

#[test]
fn test_missing_config_file() {
    let cli = CLI::new();

    cli.cmd()
        .args(["--config", "/nonexistent/invoicer.ini", "list", "products"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: Reading config"));
}

#[test]
fn test_unknown_kind() {
    let cli = CLI::new();

    cli.cmd()
        .args(["list", "widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'widgets'"));
}
