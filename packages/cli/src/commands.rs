use anyhow::{anyhow, bail, Result};
use chrono::Local;
use colored::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use shared::models::expense::{CreateExpensePayload, Expense};
use shared::models::month::ReportingMonth;
use shared::services::category_service;
use shared::services::ledger_views::{self, ExpenseFilter};

use crate::app::AppContext;
use crate::args::{
    AdminCommands, CategoryCommands, Commands, ExpenseCommands, ProfileCommands, RuleCommands,
    SalaryCommands,
};

const DASHBOARD: &str = "/dashboard";
const ADMIN: &str = "/admin/users";

pub async fn run(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => login(ctx, &email, &password).await,
        Commands::Register {
            username,
            email,
            password,
        } => register(ctx, &username, &email, &password).await,
        Commands::Logout => {
            ctx.session.logout();
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => whoami(ctx).await,
        Commands::Profile(command) => profile(ctx, command).await,
        Commands::Expenses(command) => expenses(ctx, command).await,
        Commands::Summary { month } => summary(ctx, month).await,
        Commands::Salary(SalaryCommands::Set { value, month }) => {
            ctx.require(DASHBOARD).await?;
            if let Some(month) = month {
                ctx.ledger.set_selected_month(month);
            }
            let salary = ctx.ledger.set_salary(value).await?;
            println!(
                "Salary for {} set to {}",
                ReportingMonth::from_date(salary.date),
                money(salary.value)
            );
            Ok(())
        }
        Commands::Categories(command) => categories(ctx, command).await,
        Commands::Rules(RuleCommands::Set { rules }) => {
            ctx.require(DASHBOARD).await?;
            ctx.catalog.fetch_all_categories().await;
            let rules = collect_rules(rules);
            for name in rules.keys() {
                if ctx.catalog.category_by_name(name).is_none() {
                    println!("{} unknown category {}", "skipped".yellow(), name);
                }
            }
            ctx.catalog.save_distribution_rules(&rules).await?;
            println!("Distribution rules saved.");
            Ok(())
        }
        Commands::Link { code } => {
            ctx.require(DASHBOARD).await?;
            ctx.session.link_account(&code).await?;
            println!("Account linked.");
            whoami(ctx).await
        }
        Commands::Unlink => {
            ctx.require(DASHBOARD).await?;
            ctx.session.unlink_account().await?;
            println!("Account unlinked.");
            Ok(())
        }
        Commands::ToggleContext => {
            ctx.require(DASHBOARD).await?;
            if !ctx.session.can_toggle_dashboard() {
                bail!("There is no shared household to switch to.");
            }
            ctx.session.toggle_dashboard_context().await?;
            println!("Now viewing the {} dashboard.", context_label(ctx));
            Ok(())
        }
        Commands::Admin(command) => admin(ctx, command).await,
        Commands::Theme { theme } => {
            match theme {
                Some(theme) => {
                    ctx.preferences.set_theme(theme)?;
                    println!("Theme set to {}", theme);
                }
                None => println!("{}", ctx.preferences.theme()?),
            }
            Ok(())
        }
    }
}

/// Category names match case-insensitively, so a later `NAME=PCT` replaces
/// an earlier one for the same name in any casing.
fn collect_rules(rules: Vec<(String, Decimal)>) -> BTreeMap<String, Decimal> {
    rules
        .into_iter()
        .map(|(name, percentage)| (name.to_uppercase(), percentage))
        .collect()
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn context_label(ctx: &AppContext) -> &'static str {
    if ctx.session.is_personal_dashboard() {
        "personal"
    } else {
        "shared"
    }
}

async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    if ctx.session.login(email, password).await {
        let username = ctx
            .session
            .state()
            .profile
            .map(|profile| profile.username)
            .unwrap_or_default();
        println!("Signed in as {}", username.bold());
        Ok(())
    } else {
        Err(anyhow!(ctx
            .session
            .state()
            .error
            .unwrap_or_else(|| "Login failed".to_string())))
    }
}

async fn register(ctx: &AppContext, username: &str, email: &str, password: &str) -> Result<()> {
    if ctx.session.register(username, email, password).await {
        println!("Account created. Run `finance login` to sign in.");
        Ok(())
    } else {
        Err(anyhow!(ctx
            .session
            .state()
            .error
            .unwrap_or_else(|| "Registration failed".to_string())))
    }
}

async fn whoami(ctx: &AppContext) -> Result<()> {
    ctx.require(DASHBOARD).await?;
    let state = ctx.session.state();
    let profile = state
        .profile
        .ok_or_else(|| anyhow!("No profile loaded"))?;

    println!("{} <{}>", profile.username.bold(), profile.email);
    if ctx.session.is_admin() {
        println!("role: {}", "admin".magenta());
    }
    if let Some(code) = &profile.invite_code {
        println!("invite code: {}", code);
    }
    if ctx.session.is_linked() {
        let members: Vec<&str> = profile
            .household_members
            .iter()
            .map(|member| member.username.as_str())
            .collect();
        println!("household: {}", members.join(", "));
    }
    println!("dashboard: {}", context_label(ctx));
    Ok(())
}

async fn profile(ctx: &AppContext, command: ProfileCommands) -> Result<()> {
    ctx.require(DASHBOARD).await?;
    match command {
        ProfileCommands::Show => {
            ctx.profile.fetch_profile().await;
            let state = ctx.profile.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            if let Some(profile) = state.profile {
                println!("id:       {}", profile.id);
                println!("username: {}", profile.username);
                println!("email:    {}", profile.email);
                println!(
                    "status:   {}",
                    if profile.is_active { "active" } else { "inactive" }
                );
            }
        }
        ProfileCommands::Rename { username } => {
            ctx.profile.update_profile(&username).await?;
        }
        ProfileCommands::Password { current, new } => {
            ctx.profile.change_password(&current, &new).await?;
        }
    }
    if let Some(message) = ctx.profile.success_message() {
        println!("{}", message.green());
    }
    Ok(())
}

async fn load_ledger(ctx: &AppContext, month: Option<ReportingMonth>) {
    if let Some(month) = month {
        ctx.ledger.set_selected_month(month);
    }
    ctx.ledger.fetch_expenses(false).await;
    ctx.ledger.fetch_salary(false).await;
    ctx.catalog.fetch_all_categories().await;
}

fn category_label(ctx: &AppContext, category_id: &str) -> String {
    ctx.catalog
        .category_by_id(category_id)
        .map(|category| category.name)
        .unwrap_or_else(|| format!("#{}", category_id))
}

fn resolve_category(ctx: &AppContext, category: &str) -> Result<String> {
    ctx.catalog
        .category_by_name(category)
        .or_else(|| ctx.catalog.category_by_id(category))
        .map(|category| category.id)
        .ok_or_else(|| anyhow!("Unknown category {}", category))
}

fn print_expense(ctx: &AppContext, expense: &Expense) {
    let status = if expense.paid {
        "paid".green()
    } else {
        "open".red()
    };
    println!(
        "{:>6}  {}  {:>10}  {:<6}  {:<14}  {}",
        expense.id,
        expense.date,
        money(expense.value),
        status,
        category_label(ctx, &expense.category_id),
        expense.description
    );
}

async fn expenses(ctx: &AppContext, command: ExpenseCommands) -> Result<()> {
    ctx.require(DASHBOARD).await?;
    match command {
        ExpenseCommands::List {
            month,
            from,
            to,
            category,
            by_day,
        } => {
            load_ledger(ctx, month).await;
            if let Some(error) = ctx.ledger.state().fetch_error() {
                bail!(error.to_string());
            }
            let state = ctx.ledger.state();

            if by_day {
                for day in ledger_views::totals_by_day(&state) {
                    println!("{}  {:>10}", day.date, money(day.total));
                }
                return Ok(());
            }

            let mut filter = if from.is_some() || to.is_some() {
                ExpenseFilter {
                    from,
                    to,
                    category_id: None,
                }
            } else {
                ExpenseFilter::for_month(state.selected_month)
            };
            if let Some(category) = category {
                filter.category_id = Some(resolve_category(ctx, &category)?);
            }

            let expenses = ledger_views::filter_expenses(&state, &filter);
            if expenses.is_empty() {
                println!("No matching expenses");
                return Ok(());
            }
            for expense in &expenses {
                print_expense(ctx, expense);
            }
            let total: Decimal = expenses.iter().map(|expense| expense.value).sum();
            println!(
                "{} expenses, {} total, {} categories on record",
                expenses.len(),
                money(total),
                ledger_views::unique_categories(&state).len()
            );
        }
        ExpenseCommands::Add {
            value,
            category,
            date,
            payment_method,
            card,
            installments,
            paid,
            description,
        } => {
            ctx.catalog.fetch_all_categories().await;
            let category_id = resolve_category(ctx, &category)?;

            let payload = CreateExpensePayload {
                category_id,
                value,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                payment_method: payment_method.to_uppercase(),
                card,
                installments,
                paid,
                description,
            };
            let expense = ctx.ledger.add_expense(payload).await?;
            print_expense(ctx, &expense);
        }
        ExpenseCommands::Delete { id } => {
            ctx.ledger.delete_expense(&id).await?;
            println!("Deleted expense {}", id);
        }
        ExpenseCommands::Pay { id, unpaid } => {
            ctx.ledger.set_expense_paid(&id, !unpaid).await?;
            println!(
                "Expense {} marked {}",
                id,
                if unpaid { "unpaid" } else { "paid" }
            );
        }
    }
    Ok(())
}

async fn summary(ctx: &AppContext, month: Option<ReportingMonth>) -> Result<()> {
    ctx.require(DASHBOARD).await?;
    load_ledger(ctx, month).await;
    if let Some(error) = ctx.ledger.state().fetch_error() {
        bail!(error.to_string());
    }

    let totals = ctx.ledger.totals_for_selected_month();
    let salary = ctx.ledger.salary_for_selected_month();

    println!(
        "{} ({} dashboard)",
        ctx.ledger.selected_month().to_string().bold(),
        context_label(ctx)
    );
    println!("  salary   {:>12}", money(salary));
    println!("  spent    {:>12}", money(totals.total));
    println!("  paid     {:>12}", money(totals.paid).green());
    println!("  open     {:>12}", money(totals.unpaid).red());
    println!("  per day  {:>12}", money(ctx.ledger.average_expense()));
    let balance = salary - totals.total;
    let balance = if balance.is_sign_negative() {
        money(balance).red()
    } else {
        money(balance).green()
    };
    println!("  balance  {:>12}", balance);

    let lines = ledger_views::budget_breakdown(&ctx.ledger.state(), &ctx.catalog.state().categories);
    if !lines.is_empty() {
        println!();
        for line in lines {
            let ideal = match (line.ideal_percentage, line.ideal_amount) {
                (Some(percentage), Some(amount)) => {
                    let label = format!("{}% = {}", percentage.normalize(), money(amount));
                    if line.spent > amount {
                        label.red()
                    } else {
                        label.normal()
                    }
                }
                _ => "-".dimmed(),
            };
            println!("  {:<16} {:>12}  {}", line.name, money(line.spent), ideal);
        }
    }
    Ok(())
}

async fn categories(ctx: &AppContext, command: CategoryCommands) -> Result<()> {
    ctx.require(DASHBOARD).await?;
    match command {
        CategoryCommands::List => {
            ctx.catalog.fetch_all_categories().await;
            let state = ctx.catalog.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            for category in &state.categories {
                let share = category
                    .ideal_percentage
                    .map(|percentage| format!("{}%", percentage.normalize()))
                    .unwrap_or_default();
                println!("{:>6}  {:<16} {:>6}  {}", category.id, category.name, share, category.icon);
            }
        }
        CategoryCommands::Add { name, icon } => {
            let category = ctx.catalog.create_category(&name, &icon).await?;
            println!("Created category {} ({})", category.name, category.id);
        }
        CategoryCommands::Delete { id } => {
            ctx.catalog.fetch_all_categories().await;
            let known = category_service::category_by_id(&ctx.catalog.state(), &id).is_some();
            ctx.catalog.delete_category(&id).await?;
            if known {
                println!("Deleted category {}", id);
            } else {
                println!("Deleted category #{} (was not listed)", id);
            }
        }
    }
    Ok(())
}

async fn admin(ctx: &AppContext, command: AdminCommands) -> Result<()> {
    ctx.require(ADMIN).await?;
    let ok = match command {
        AdminCommands::Users => {
            let ok = ctx.admin.fetch_all_users().await;
            for user in &ctx.admin.state().users {
                let status = if user.is_active {
                    "active".green()
                } else {
                    "inactive".red()
                };
                let linking = if user.can_link_accounts { "can link" } else { "" };
                println!(
                    "{:>6}  {:<16} {:<28} {:<8} {:<8} {}",
                    user.id, user.username, user.email, user.role, status, linking
                );
            }
            ok
        }
        AdminCommands::Activate { id } => ctx.admin.set_user_active_status(id, true).await,
        AdminCommands::Deactivate { id } => ctx.admin.set_user_active_status(id, false).await,
        AdminCommands::AllowLinking { id, revoke } => {
            ctx.admin.set_user_linking_status(id, !revoke).await
        }
        AdminCommands::Delete { id } => ctx.admin.delete_user(id).await,
    };

    if ok {
        Ok(())
    } else {
        Err(anyhow!(ctx
            .admin
            .state()
            .error
            .unwrap_or_else(|| "Admin request failed".to_string())))
    }
}
