//! Embedded DDL for the storefront's tables, row-level security policies and
//! the profile-creation trigger.
//!
//! Every statement is safe to run again: tables use `IF NOT EXISTS`, the
//! function uses `OR REPLACE`, the trigger is dropped before it is created and
//! each policy is wrapped in a `DO` block that checks `pg_policies` first,
//! since Postgres has no `CREATE POLICY IF NOT EXISTS`.

pub const TABLES: [&str; 3] = ["profiles", "items", "pawn_requests"];

pub const TRIGGER_NAME: &str = "on_auth_user_created";
pub const TRIGGER_FUNCTION: &str = "handle_new_user";

/// Row-level policy definition on a `public` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDef {
    pub table: &'static str,
    pub name: &'static str,
    /// Everything after `CREATE POLICY "<name>" ON public.<table>`.
    pub body: &'static str,
}

pub const POLICIES: [PolicyDef; 5] = [
    PolicyDef {
        table: "profiles",
        name: "Users can view own profile",
        body: "FOR SELECT USING (auth.uid() = id)",
    },
    PolicyDef {
        table: "profiles",
        name: "Users can update own profile",
        body: "FOR UPDATE USING (auth.uid() = id)",
    },
    PolicyDef {
        table: "items",
        name: "Items are viewable by everyone",
        body: "FOR SELECT USING (true)",
    },
    PolicyDef {
        table: "pawn_requests",
        name: "Users can view own pawn requests",
        body: "FOR SELECT USING (auth.uid() = user_id)",
    },
    PolicyDef {
        table: "pawn_requests",
        name: "Users can create own pawn requests",
        body: "FOR INSERT WITH CHECK (auth.uid() = user_id)",
    },
];

/// One named DDL statement. The name is what gets logged and reported when the
/// statement fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatement {
    pub name: String,
    pub sql: String,
}

impl SchemaStatement {
    fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

const CREATE_PROFILES: &str = r#"
CREATE TABLE IF NOT EXISTS public.profiles (
    id UUID PRIMARY KEY REFERENCES auth.users (id) ON DELETE CASCADE,
    email TEXT,
    full_name TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS public.items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL,
    description TEXT,
    price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
    category TEXT,
    image_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_PAWN_REQUESTS: &str = r#"
CREATE TABLE IF NOT EXISTS public.pawn_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES auth.users (id) ON DELETE CASCADE,
    item_description TEXT NOT NULL,
    requested_amount NUMERIC(10, 2) NOT NULL CHECK (requested_amount > 0),
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'approved', 'rejected')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_HANDLE_NEW_USER: &str = r#"
CREATE OR REPLACE FUNCTION public.handle_new_user()
RETURNS TRIGGER
LANGUAGE plpgsql
SECURITY DEFINER SET search_path = public
AS $$
BEGIN
    INSERT INTO public.profiles (id, email, full_name)
    VALUES (NEW.id, NEW.email, NEW.raw_user_meta_data ->> 'full_name');
    RETURN NEW;
END;
$$"#;

const DROP_TRIGGER: &str = "DROP TRIGGER IF EXISTS on_auth_user_created ON auth.users";

const CREATE_TRIGGER: &str = r#"
CREATE TRIGGER on_auth_user_created
    AFTER INSERT ON auth.users
    FOR EACH ROW EXECUTE PROCEDURE public.handle_new_user()"#;

/// Wraps `CREATE POLICY` in an existence check against `pg_policies`.
pub fn guarded_policy_sql(policy: &PolicyDef) -> String {
    let literal = policy.name.replace('\'', "''");
    let ident = policy.name.replace('"', "\"\"");
    format!(
        r#"
DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM pg_policies
        WHERE schemaname = 'public' AND tablename = '{table}' AND policyname = '{literal}'
    ) THEN
        CREATE POLICY "{ident}" ON public.{table} {body};
    END IF;
END
$$"#,
        table = policy.table,
        literal = literal,
        ident = ident,
        body = policy.body,
    )
}

/// The full bootstrap, in execution order.
pub fn bootstrap_statements() -> Vec<SchemaStatement> {
    let mut statements = vec![
        SchemaStatement::new("create table profiles", CREATE_PROFILES),
        SchemaStatement::new("create table items", CREATE_ITEMS),
        SchemaStatement::new("create table pawn_requests", CREATE_PAWN_REQUESTS),
    ];

    statements.extend(TABLES.iter().map(|table| {
        SchemaStatement::new(
            format!("enable row level security on {}", table),
            format!("ALTER TABLE public.{} ENABLE ROW LEVEL SECURITY", table),
        )
    }));

    statements.extend(POLICIES.iter().map(|policy| {
        SchemaStatement::new(
            format!("policy \"{}\" on {}", policy.name, policy.table),
            guarded_policy_sql(policy),
        )
    }));

    statements.push(SchemaStatement::new(
        "create function handle_new_user",
        CREATE_HANDLE_NEW_USER,
    ));
    statements.push(SchemaStatement::new(
        "drop trigger on_auth_user_created",
        DROP_TRIGGER,
    ));
    statements.push(SchemaStatement::new(
        "create trigger on_auth_user_created",
        CREATE_TRIGGER,
    ));

    statements
}

/// Minimal stand-ins for Supabase's `auth` schema so the bootstrap can run
/// against a plain Postgres database.
pub fn auth_shim_statements() -> Vec<SchemaStatement> {
    vec![
        SchemaStatement::new("create schema auth", "CREATE SCHEMA IF NOT EXISTS auth"),
        SchemaStatement::new(
            "create table auth.users",
            r#"
CREATE TABLE IF NOT EXISTS auth.users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email TEXT,
    raw_user_meta_data JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#,
        ),
        SchemaStatement::new(
            "create function auth.uid",
            r#"
CREATE OR REPLACE FUNCTION auth.uid()
RETURNS UUID
LANGUAGE sql STABLE
AS $$
    SELECT NULLIF(current_setting('request.jwt.claim.sub', true), '')::uuid
$$"#,
        ),
    ]
}

/// Renders statements as a script an operator can paste into an SQL editor.
pub fn render_script(statements: &[SchemaStatement]) -> String {
    let mut script = String::new();
    for statement in statements {
        script.push_str("-- ");
        script.push_str(&statement.name);
        script.push('\n');
        script.push_str(statement.sql.trim());
        script.push_str(";\n\n");
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_created_before_anything_references_them() {
        let statements = bootstrap_statements();
        let names: Vec<&str> = statements.iter().map(|s| s.name.as_str()).collect();

        let last_table = names
            .iter()
            .rposition(|name| name.starts_with("create table"))
            .unwrap();
        let first_other = names
            .iter()
            .position(|name| !name.starts_with("create table"))
            .unwrap();
        assert!(last_table < first_other);
    }

    #[test]
    fn trigger_is_dropped_immediately_before_it_is_created() {
        let statements = bootstrap_statements();
        let drop = statements
            .iter()
            .position(|s| s.name == "drop trigger on_auth_user_created")
            .unwrap();
        assert_eq!(statements[drop + 1].name, "create trigger on_auth_user_created");
    }

    #[test]
    fn every_create_is_idempotent() {
        for statement in bootstrap_statements() {
            let sql = statement.sql.to_uppercase();
            if sql.contains("CREATE TABLE") {
                assert!(sql.contains("IF NOT EXISTS"), "{}", statement.name);
            }
            if sql.contains("CREATE FUNCTION") || sql.contains("CREATE OR REPLACE FUNCTION") {
                assert!(sql.contains("OR REPLACE"), "{}", statement.name);
            }
            if sql.contains("CREATE POLICY") {
                assert!(sql.contains("IF NOT EXISTS"), "{}", statement.name);
            }
        }
    }

    #[test]
    fn rls_is_enabled_on_every_table() {
        let statements = bootstrap_statements();
        for table in TABLES {
            let expected = format!("ALTER TABLE public.{} ENABLE ROW LEVEL SECURITY", table);
            assert!(statements.iter().any(|s| s.sql == expected), "{table}");
        }
    }

    #[test]
    fn policy_sql_quotes_names() {
        let policy = PolicyDef {
            table: "items",
            name: "Owner's \"special\" policy",
            body: "FOR SELECT USING (true)",
        };
        let sql = guarded_policy_sql(&policy);
        assert!(sql.contains("policyname = 'Owner''s \"special\" policy'"));
        assert!(sql.contains("CREATE POLICY \"Owner's \"\"special\"\" policy\" ON public.items"));
    }

    #[test]
    fn script_terminates_each_statement() {
        let script = render_script(&auth_shim_statements());
        assert_eq!(script.matches(";\n\n").count(), 3);
        assert!(script.starts_with("-- create schema auth\n"));
    }
}
