//! Tick cycle: the ordered phases that advance the economy by one step.
//!
//! Each tick runs through these phases:
//!
//! 1. **Labor market** -- the registry matches last tick's job offers and
//!    applies the wage floor; employers absorb their matches.
//!
//! 2. **Employers** -- adjust staffing (posting new offers), invest in R&D,
//!    produce, sell, pay wages into household checking accounts, and check
//!    solvency. Bankrupt employers are closed; employers at the end of
//!    their growth phase found a spinoff.
//!
//! 3. **Fiscal** -- the state taxes, confiscates, and distributes; the
//!    environmental agency taxes, forwards to the state, and audits; the
//!    recycler processes the waste routed to it.
//!
//! 4. **Households** -- consumption, child-rearing, loan service, savings
//!    sweep, growth phase and split, then aging with succession or exit.
//!    Children founded by a split join the population and the labor market
//!    at the end of the phase.
//!
//! 5. **Savings bank** -- the per-account cap is enforced.
//!
//! 6. **Audit** -- internal flows must balance and the change in money
//!    supply must equal booked inflows minus outflows. Anomalies are logged
//!    and reported, never fatal.
//!
//! Every money movement is booked in the [`Ledger`] as it happens.
//!
//! [`Ledger`]: warengeld_ledger::Ledger

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use warengeld_agents::{
    AgentError, CompanyOutcome, Household, LifeStage, Registry, SavingsBank, Sparkasse, Workforce,
};
use warengeld_fiscal::{FiscalError, State};
use warengeld_ledger::{ConservationResult, Ledger, LedgerAnomaly, LedgerError, TransferParams};
use warengeld_types::{AgentId, AgentKind, CompanyStatus, FiscalSubject, FlowKind, LevyKind, Party};

use crate::economy::Economy;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A ledger entry was rejected.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// An agent operation failed or a collaborator is missing.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A fiscal operation failed.
    #[error("fiscal error: {source}")]
    Fiscal {
        /// The underlying fiscal error.
        #[from]
        source: FiscalError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Worker-to-offer matches made by the registry.
    pub matches: usize,
    /// Matches employers took on.
    pub hired: usize,
    /// Workers fired to meet staffing targets.
    pub fired: usize,
    /// Employers that went bankrupt this tick.
    pub bankruptcies: Vec<AgentId>,
    /// Spinoffs founded by employers at the end of their growth phase.
    pub company_spinoffs: Vec<AgentId>,
    /// Research spending leaving the economy.
    pub rd_investment: Decimal,
    /// Innovations that raised an employer's capacity.
    pub innovations: usize,
    /// Sales revenue entering the economy.
    pub sales: Decimal,
    /// Wages paid to households.
    pub wages_paid: Decimal,
    /// Land and environmental tax collected by the state.
    pub state_taxes: Decimal,
    /// Hyperwealth confiscated by the state.
    pub confiscated: Decimal,
    /// Environmental tax collected by the agency.
    pub env_tax: Decimal,
    /// Audit penalties collected by the agency.
    pub penalties: Decimal,
    /// Materials recycled this tick.
    pub recycled: Decimal,
    /// Household consumption leaving the economy.
    pub consumption: Decimal,
    /// Savings spent on raising children.
    pub child_rearing: Decimal,
    /// Loan principal repaid to the bank.
    pub loan_repayments: Decimal,
    /// Savings deposited with the bank.
    pub deposits: Decimal,
    /// Savings removed above the bank's cap.
    pub write_offs: Decimal,
    /// Households that entered the growth phase.
    pub growth_entries: usize,
    /// Child households founded by a split.
    pub household_splits: usize,
    /// Households succeeded by an heir.
    pub successions: usize,
    /// Households that left without an heir.
    pub exits: usize,
    /// Mean financial health score of the households processed.
    pub mean_financial_health: Decimal,
    /// Households alive at end of tick.
    pub households: usize,
    /// Employers active at end of tick.
    pub active_companies: usize,
    /// Employed workers at end of tick.
    pub employed: usize,
    /// Money supply at end of tick.
    pub money_supply: Decimal,
    /// Conservation violations found by the audit.
    pub anomalies: Vec<LedgerAnomaly>,
}

/// Execute one complete tick of the economy.
///
/// # Errors
///
/// Returns [`TickError::Agent`] with [`AgentError::MissingCollaborator`]
/// when employers exist but no registry is configured. Nothing is mutated
/// in that case.
pub fn run_tick(economy: &mut Economy) -> Result<TickSummary, TickError> {
    if economy.registry.is_none() && !economy.companies.is_empty() {
        return Err(AgentError::MissingCollaborator {
            operation: "adjust_employees",
            collaborator: "registry",
        }
        .into());
    }

    let tick = economy.tick.saturating_add(1);
    let supply_before = economy.money_supply();
    info!(tick, money_supply = %supply_before, "Tick started");

    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    // --- Phase 1: Labor market ---
    phase_labor_market(economy, tick, &mut summary);

    // --- Phase 2: Employers ---
    phase_employers(economy, tick, &mut summary)?;

    // --- Phase 3: Fiscal ---
    phase_fiscal(economy, tick, &mut summary)?;

    // --- Phase 4: Households ---
    phase_households(economy, tick, &mut summary)?;

    // --- Phase 5: Savings bank ---
    phase_savings_bank(economy, tick, &mut summary)?;

    // --- Phase 6: Audit ---
    economy.tick = tick;
    let supply_after = economy.money_supply();
    summary.anomalies = audit(economy, tick, supply_before, supply_after);

    summary.households = economy.households.len();
    summary.active_companies = economy.companies.len();
    summary.employed = economy.workforce.employed_count();
    summary.money_supply = supply_after;

    info!(
        tick,
        households = summary.households,
        companies = summary.active_companies,
        employed = summary.employed,
        money_supply = %supply_after,
        anomalies = summary.anomalies.len(),
        "Tick complete"
    );
    Ok(summary)
}

/// Match workers and let employers take on their matches.
fn phase_labor_market(economy: &mut Economy, tick: u64, summary: &mut TickSummary) {
    let Some(registry) = economy.registry.as_mut() else {
        return;
    };
    let matches = registry.step(tick, &mut economy.workforce);
    summary.matches = matches.len();

    let mut employers = BTreeSet::new();
    for company in &mut economy.companies {
        let hired = company.absorb_matches(&matches, &mut economy.workforce);
        summary.hired = summary.hired.saturating_add(hired);
        employers.insert(company.id());
    }

    // Offers posted by employers that have since closed.
    for m in matches.iter().filter(|m| !employers.contains(&m.employer)) {
        economy.workforce.release(m.worker);
        warn!(worker = %m.worker, employer = %m.employer, "Match for closed employer released");
    }
}

/// Staffing, production, sales, wages, and solvency for every employer.
fn phase_employers(
    economy: &mut Economy,
    tick: u64,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    if economy.companies.is_empty() {
        return Ok(());
    }
    let registry = economy
        .registry
        .as_mut()
        .ok_or(AgentError::MissingCollaborator {
            operation: "adjust_employees",
            collaborator: "registry",
        })?;

    let mut spinoffs = Vec::new();
    for company in &mut economy.companies {
        let change = company.adjust_employees(registry, &mut economy.workforce);
        summary.fired = summary.fired.saturating_add(change.fired.len());
        let company_party = Party::new(company.id(), AgentKind::Company);

        let invested = company.invest_in_rd();
        if invested > Decimal::ZERO {
            economy
                .ledger
                .record_rd_investment(tick, invested, company_party)?;
            summary.rd_investment = summary.rd_investment.saturating_add(invested);
        }
        if company.innovate() {
            summary.innovations = summary.innovations.saturating_add(1);
        }

        company.produce();
        let revenue = company.sell_goods(None);
        if revenue > Decimal::ZERO {
            economy.ledger.record_sale(tick, revenue, company_party)?;
            summary.sales = summary.sales.saturating_add(revenue);
        }

        for payment in company.pay_wages(&economy.workforce) {
            let household = find_household(&mut economy.households, payment.worker)?;
            household.finances().process_income(Some(payment.amount));
            economy.ledger.record_wage(
                tick,
                payment.amount,
                company_party,
                Party::new(payment.worker, AgentKind::Household),
            )?;
            summary.wages_paid = summary.wages_paid.saturating_add(payment.amount);
        }

        if company.step(tick, &mut economy.workforce) == CompanyOutcome::Bankrupt {
            summary.bankruptcies.push(company.id());
            continue;
        }

        if company.update_growth_state() {
            let spinoff = company.split_company();
            let endowment = spinoff.sight_balance();
            if endowment > Decimal::ZERO {
                economy.ledger.record_internal(
                    tick,
                    FlowKind::Endowment,
                    endowment,
                    company_party,
                    Party::new(spinoff.id(), AgentKind::Company),
                )?;
            }
            summary.company_spinoffs.push(spinoff.id());
            spinoffs.push(spinoff);
        }
    }

    if !summary.bankruptcies.is_empty() {
        let (closed, active): (Vec<_>, Vec<_>) = std::mem::take(&mut economy.companies)
            .into_iter()
            .partition(|c| c.status() == CompanyStatus::Bankrupt);
        economy.companies = active;
        economy.closed_companies.extend(closed);
    }
    economy.companies.extend(spinoffs);

    debug!(
        tick,
        sales = %summary.sales,
        wages = %summary.wages_paid,
        rd_investment = %summary.rd_investment,
        bankruptcies = summary.bankruptcies.len(),
        spinoffs = summary.company_spinoffs.len(),
        "Employer phase complete"
    );
    Ok(())
}

/// State, environmental agency, and recycler, in that order.
fn phase_fiscal(
    economy: &mut Economy,
    tick: u64,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let mut subjects: Vec<&mut dyn FiscalSubject> = economy
        .companies
        .iter_mut()
        .map(|c| c as &mut dyn FiscalSubject)
        .chain(
            economy
                .households
                .iter_mut()
                .map(|h| h as &mut dyn FiscalSubject),
        )
        .collect();

    let state_levies = economy.state.step(tick, &mut subjects);
    let report = economy
        .agency
        .step(tick, &mut subjects, Some(&mut economy.state))?;

    for levy in state_levies.iter().filter(|l| l.amount > Decimal::ZERO) {
        economy.ledger.record_levy(tick, levy)?;
        if levy.kind == LevyKind::Confiscation {
            summary.confiscated = summary.confiscated.saturating_add(levy.amount);
        } else {
            summary.state_taxes = summary.state_taxes.saturating_add(levy.amount);
        }
    }
    for levy in report.collection.levies.iter().filter(|l| l.amount > Decimal::ZERO) {
        economy.ledger.record_levy(tick, levy)?;
    }
    summary.env_tax = report.collection.total;

    let forwarded = report.collection.forwarded();
    if forwarded > Decimal::ZERO {
        economy.ledger.record_internal(
            tick,
            FlowKind::Transfer,
            forwarded,
            Party::new(economy.agency.id(), AgentKind::EnvironmentalAgency),
            Party::new(economy.state.id(), AgentKind::State),
        )?;
    }

    for levy in report.penalties.iter().filter(|l| l.amount > Decimal::ZERO) {
        economy.ledger.record_levy(tick, levy)?;
        summary.penalties = summary.penalties.saturating_add(levy.amount);
    }

    if let Some(recycler) = economy.agency.recycler_mut() {
        let before = recycler.report_materials();
        let after = recycler.step(tick);
        summary.recycled = after.saturating_sub(before);
    }

    debug!(
        tick,
        state_taxes = %summary.state_taxes,
        env_tax = %summary.env_tax,
        penalties = %summary.penalties,
        "Fiscal phase complete"
    );
    Ok(())
}

/// Per-household finances, growth and split, then aging.
fn phase_households(
    economy: &mut Economy,
    tick: u64,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let params = economy.household_params.clone();
    let bank_party = economy
        .bank
        .as_ref()
        .map(|b| Party::new(b.id(), AgentKind::SavingsBank));
    let mut books = Books {
        tick,
        ledger: &mut economy.ledger,
        bank: &mut economy.bank,
        bank_party,
    };
    let mut exited = BTreeSet::new();
    let mut newborn = Vec::new();
    let mut health_total = Decimal::ZERO;

    for household in &mut economy.households {
        let id = household.id();
        let worker = economy
            .workforce
            .get(id)
            .ok_or(AgentError::WorkerNotFound(id))?;
        household.income = worker
            .current_wage()
            .filter(|_| worker.is_employed())
            .unwrap_or(Decimal::ZERO);

        settle_finances(household, &mut books, summary)?;

        // Growth phase and split.
        if household.update_growth_state(
            savings_at(books.bank.as_ref(), id),
            params.savings_growth_trigger,
        ) {
            summary.growth_entries = summary.growth_entries.saturating_add(1);
        }
        if household.ready_to_split(params.growth_threshold) {
            newborn.push(split_household(household, &mut books, params.split_savings_share)?);
            summary.household_splits = summary.household_splits.saturating_add(1);
        }

        // Reporting.
        let finances = household.finances();
        let bank_view = books.bank.as_ref().map(|b| b as &dyn SavingsBank);
        health_total =
            health_total.saturating_add(finances.financial_health_score(&params.health));
        debug!(summary = ?finances.financial_summary(bank_view), "Household finances");

        // Aging.
        household.age_one_step();
        match household.life_stage(&params) {
            LifeStage::Active => {}
            LifeStage::Succession => {
                pass_to_heir(
                    household,
                    &mut books,
                    economy.registry.as_mut(),
                    &mut economy.workforce,
                )?;
                summary.successions = summary.successions.saturating_add(1);
            }
            LifeStage::Exit => {
                let estate = settle_estate(household, &mut books, &mut economy.state)?;
                if let Some(registry) = economy.registry.as_mut() {
                    registry.deregister_worker(id);
                }
                economy.workforce.remove(id);
                info!(household = %id, generation = household.generation, estate = %estate, "Household exited");
                exited.insert(id);
            }
        }
    }

    summary.mean_financial_health = health_total
        .checked_div(Decimal::from(economy.households.len()))
        .unwrap_or(Decimal::ZERO);

    if !exited.is_empty() {
        economy.households.retain(|h| !exited.contains(&h.id()));
        summary.exits = exited.len();
    }
    for child in newborn {
        economy.workforce.enroll(child.id());
        if let Some(registry) = economy.registry.as_mut() {
            registry.register_worker(child.id());
        }
        economy.households.push(child);
    }

    debug!(
        tick,
        consumption = %summary.consumption,
        deposits = %summary.deposits,
        splits = summary.household_splits,
        successions = summary.successions,
        exits = summary.exits,
        "Household phase complete"
    );
    Ok(())
}

/// The ledger and bank as seen by one household's bookkeeping.
struct Books<'a> {
    tick: u64,
    ledger: &'a mut Ledger,
    bank: &'a mut Option<Sparkasse>,
    bank_party: Option<Party>,
}

/// Consumption, child-rearing, loan service, and the savings sweep.
fn settle_finances(
    household: &mut Household,
    books: &mut Books<'_>,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let tick = books.tick;
    let id = household.id();
    let party = Party::new(id, AgentKind::Household);

    // Consumption.
    let rate = household.current_consumption_rate();
    let consumed = household.finances().manage_consumption(rate);
    if consumed > Decimal::ZERO {
        books.ledger.record_consumption(tick, consumed, party)?;
        summary.consumption = summary.consumption.saturating_add(consumed);
    }

    // Child-rearing: savings are drawn into checking, then spent.
    let at_bank = savings_at(books.bank.as_ref(), id);
    let drawn = household
        .finances()
        .handle_childrearing_costs(as_savings_bank(books.bank));
    let from_bank = at_bank.saturating_sub(savings_at(books.bank.as_ref(), id));
    if let Some(bank_party) = books.bank_party
        && from_bank > Decimal::ZERO
    {
        books
            .ledger
            .record_internal(tick, FlowKind::Withdrawal, from_bank, bank_party, party)?;
    }
    if drawn > Decimal::ZERO {
        household.checking_account = household.checking_account.saturating_sub(drawn);
        books.ledger.record_transfer(TransferParams {
            tick,
            flow: FlowKind::Consumption,
            from: Some(party),
            to: None,
            amount: drawn,
            reason: "CHILD_REARING".to_owned(),
        })?;
        summary.child_rearing = summary.child_rearing.saturating_add(drawn);
    }

    // Loan service.
    if let (Some(bank), Some(bank_party)) = (books.bank.as_mut(), books.bank_party) {
        let paid = household.finances().repay_savings_loans(bank);
        if paid > Decimal::ZERO {
            books
                .ledger
                .record_internal(tick, FlowKind::LoanRepayment, paid, party, bank_party)?;
            summary.loan_repayments = summary.loan_repayments.saturating_add(paid);
        }
    }

    // Savings sweep.
    let at_bank = savings_at(books.bank.as_ref(), id);
    household
        .finances()
        .optimize_savings(as_savings_bank(books.bank));
    let deposited = savings_at(books.bank.as_ref(), id).saturating_sub(at_bank);
    if let Some(bank_party) = books.bank_party
        && deposited > Decimal::ZERO
    {
        books
            .ledger
            .record_internal(tick, FlowKind::Deposit, deposited, party, bank_party)?;
        summary.deposits = summary.deposits.saturating_add(deposited);
    }
    Ok(())
}

/// Replace a household by its heir: worker slot, bank account, and cash
/// all move to the new identity.
fn pass_to_heir(
    household: &mut Household,
    books: &mut Books<'_>,
    registry: Option<&mut Registry>,
    workforce: &mut Workforce,
) -> Result<(), TickError> {
    let id = household.id();
    let heir = household.clone().into_successor();
    let heir_id = heir.id();
    *household = heir;

    if let Some(registry) = registry {
        registry.replace_worker(id, heir_id);
    }
    workforce.remove(id);
    workforce.enroll(heir_id);
    if let Some(bank) = books.bank.as_mut() {
        bank.reassign_account(id, heir_id);
    }

    let inherited = household.cash();
    if inherited > Decimal::ZERO {
        books.ledger.record_internal(
            books.tick,
            FlowKind::Estate,
            inherited,
            Party::new(id, AgentKind::Household),
            Party::new(heir_id, AgentKind::Household),
        )?;
    }
    Ok(())
}

/// Endow a child household from the parent's savings, bank first.
fn split_household(
    household: &mut Household,
    books: &mut Books<'_>,
    share: Decimal,
) -> Result<Household, TickError> {
    let tick = books.tick;
    let party = Party::new(household.id(), AgentKind::Household);
    let funding = household
        .finances()
        .fund_split(share, as_savings_bank(books.bank));
    if let Some(bank_party) = books.bank_party
        && funding.from_bank > Decimal::ZERO
    {
        books.ledger.record_internal(
            tick,
            FlowKind::Withdrawal,
            funding.from_bank,
            bank_party,
            party,
        )?;
    }

    let endowment = funding.total();
    let child = household.spawn_child(endowment);
    if endowment > Decimal::ZERO {
        books.ledger.record_internal(
            tick,
            FlowKind::Endowment,
            endowment,
            party,
            Party::new(child.id(), AgentKind::Household),
        )?;
    }
    Ok(child)
}

/// Close the bank account of a leaving household and settle its estate
/// with the state. Returns the estate, negative for debt.
fn settle_estate(
    household: &mut Household,
    books: &mut Books<'_>,
    state: &mut State,
) -> Result<Decimal, TickError> {
    let tick = books.tick;
    let id = household.id();
    let party = Party::new(id, AgentKind::Household);

    if let (Some(bank), Some(bank_party)) = (books.bank.as_mut(), books.bank_party) {
        let withdrawn = bank.withdraw(id, bank.savings_of(id));
        if withdrawn > Decimal::ZERO {
            household.checking_account = household.checking_account.saturating_add(withdrawn);
            books
                .ledger
                .record_internal(tick, FlowKind::Withdrawal, withdrawn, bank_party, party)?;
        }
    }

    let estate = household.take_estate();
    if let Some(levy) = state.receive_estate(id, estate) {
        books.ledger.record_levy(tick, &levy)?;
    } else if estate < Decimal::ZERO {
        let settled = state.cover_estate_deficit(id, estate.abs());
        books.ledger.record_internal(
            tick,
            FlowKind::Estate,
            settled,
            Party::new(state.id(), AgentKind::State),
            party,
        )?;
    }
    Ok(estate)
}

/// Enforce the bank's savings cap.
fn phase_savings_bank(
    economy: &mut Economy,
    tick: u64,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let Some(bank) = economy.bank.as_mut() else {
        return Ok(());
    };
    let bank_party = Party::new(bank.id(), AgentKind::SavingsBank);
    for write_off in bank.step(tick) {
        economy
            .ledger
            .record_write_off(tick, write_off.amount, bank_party)?;
        summary.write_offs = summary.write_offs.saturating_add(write_off.amount);
    }
    Ok(())
}

/// Check the tick's books against the observed money supply.
fn audit(
    economy: &Economy,
    tick: u64,
    supply_before: Decimal,
    supply_after: Decimal,
) -> Vec<LedgerAnomaly> {
    let checks = [
        economy.ledger.verify_conservation(tick),
        economy
            .ledger
            .verify_money_supply(tick, supply_before, supply_after),
    ];
    let mut anomalies = Vec::new();
    for result in checks {
        if let ConservationResult::Anomaly(anomaly) = result {
            error!(
                tick,
                expected = %anomaly.expected,
                actual = %anomaly.actual,
                message = %anomaly.message,
                "Money conservation anomaly"
            );
            anomalies.push(anomaly);
        }
    }
    anomalies
}

fn find_household(households: &mut [Household], id: AgentId) -> Result<&mut Household, AgentError> {
    households
        .iter_mut()
        .find(|h| h.id() == id)
        .ok_or(AgentError::HouseholdNotFound(id))
}

fn savings_at(bank: Option<&Sparkasse>, id: AgentId) -> Decimal {
    bank.map_or(Decimal::ZERO, |b| b.savings_of(id))
}

fn as_savings_bank(bank: &mut Option<Sparkasse>) -> Option<&mut dyn SavingsBank> {
    bank.as_mut().map(|b| b as &mut dyn SavingsBank)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use warengeld_agents::{
        BankParams, CompanyParams, CompanySeed, HouseholdParams, HouseholdSeed, LaborParams,
        Registry, Sparkasse,
    };
    use warengeld_fiscal::{EnvironmentParams, EnvironmentalAgency, State, TaxParams};

    use warengeld_types::Balance;

    use super::*;

    fn economy(registry: bool, bank: bool) -> Economy {
        Economy::new(
            registry.then(|| Registry::new(&LaborParams::default())),
            State::new(TaxParams::default()),
            EnvironmentalAgency::new(EnvironmentParams::default()).unwrap(),
            bank.then(|| Sparkasse::new(&BankParams::default())),
            HouseholdParams::default(),
            CompanyParams::default(),
        )
    }

    fn household_seed(checking: Decimal) -> HouseholdSeed {
        HouseholdSeed {
            income: dec!(10),
            land_area: Decimal::ZERO,
            environmental_impact: Decimal::ZERO,
            checking_account: checking,
        }
    }

    fn company_seed(balance: Decimal) -> CompanySeed {
        CompanySeed {
            production_capacity: dec!(22),
            max_employees: 2,
            land_area: Decimal::ZERO,
            environmental_impact: Decimal::ZERO,
            sight_balance: balance,
        }
    }

    #[test]
    fn employers_without_registry_fail_fast() {
        let mut e = economy(false, true);
        e.add_company(&company_seed(dec!(100)));
        let before = e.money_supply();

        let result = run_tick(&mut e);
        assert!(matches!(
            result,
            Err(TickError::Agent {
                source: AgentError::MissingCollaborator { collaborator: "registry", .. }
            })
        ));
        assert_eq!(e.tick, 0);
        assert_eq!(e.money_supply(), before);
        assert!(e.ledger.is_empty());
    }

    #[test]
    fn households_alone_need_no_registry() {
        let mut e = economy(false, false);
        e.add_household(&household_seed(dec!(100)));
        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.consumption, dec!(70));
        assert!(summary.anomalies.is_empty());
        // The remainder is swept into local savings.
        let h = e.households.first().unwrap();
        assert_eq!(h.checking_account, Decimal::ZERO);
        assert_eq!(h.local_savings, dec!(30));
        // Assets 30 of 1000 and no income without an employer.
        assert_eq!(summary.mean_financial_health, dec!(0.018));
    }

    #[test]
    fn offers_are_filled_on_the_next_tick() {
        let mut e = economy(true, true);
        for _ in 0..3 {
            e.add_household(&household_seed(Decimal::ZERO));
        }
        let company = e.add_company(&company_seed(dec!(1000)));

        // Tick 1: capacity 22 / ratio 11 requests two workers.
        let first = run_tick(&mut e).unwrap();
        assert_eq!(first.matches, 0);
        assert_eq!(e.registry.as_ref().unwrap().job_offers().len(), 1);

        // Tick 2: both positions filled and paid at the default wage.
        let second = run_tick(&mut e).unwrap();
        assert_eq!(second.matches, 2);
        assert_eq!(second.hired, 2);
        assert_eq!(second.employed, 2);
        assert_eq!(second.wages_paid, dec!(20));
        assert!(second.anomalies.is_empty());
        let employer = e.companies.iter().find(|c| c.id() == company).unwrap();
        assert_eq!(employer.employees().len(), 2);
    }

    #[test]
    fn bankrupt_employer_is_closed_and_stays_on_the_books() {
        let mut e = economy(true, false);
        e.add_household(&household_seed(Decimal::ZERO));
        let id = e.add_company(&company_seed(dec!(-500)));

        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.bankruptcies, vec![id]);
        assert!(e.companies.is_empty());
        assert_eq!(e.closed_companies.len(), 1);
        assert!(summary.anomalies.is_empty());
        assert_eq!(summary.money_supply, e.money_supply());
    }

    #[test]
    fn exit_leaves_estate_to_the_state() {
        let mut e = economy(true, true);
        e.household_params.max_age = 1;
        e.household_params.max_generation = 0;
        let id = e.add_household(&household_seed(dec!(100)));

        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.exits, 1);
        assert!(e.households.is_empty());
        assert!(e.workforce.is_empty());
        assert!(!e.registry.as_ref().unwrap().is_registered(id));
        // 30 swept into the bank, withdrawn again, then left to the state.
        assert_eq!(e.state.tax_revenue(), dec!(30));
        assert_eq!(e.ledger.total_for_flow(FlowKind::Estate), dec!(30));
        assert!(summary.anomalies.is_empty());
    }

    #[test]
    fn exit_with_debt_is_settled_by_the_state() {
        let mut e = economy(true, false);
        e.household_params.max_age = 1;
        e.household_params.max_generation = 0;
        e.add_household(&household_seed(dec!(-40)));

        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.exits, 1);
        assert_eq!(e.state.tax_revenue(), dec!(-40));
        assert!(summary.anomalies.is_empty());
    }

    #[test]
    fn succession_moves_identity_and_cash() {
        let mut e = economy(true, true);
        e.household_params.max_age = 1;
        let old = e.add_household(&household_seed(dec!(100)));

        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.successions, 1);
        let heir = e.households.first().unwrap();
        assert_ne!(heir.id(), old);
        assert_eq!(heir.generation, 1);
        assert_eq!(heir.age, 0);

        let registry = e.registry.as_ref().unwrap();
        assert!(registry.is_registered(heir.id()));
        assert!(!registry.is_registered(old));
        assert!(e.workforce.contains(heir.id()));
        assert!(!e.workforce.contains(old));
        // The bank account follows the heir.
        assert_eq!(e.bank.as_ref().unwrap().savings_of(heir.id()), dec!(30));
        assert!(summary.anomalies.is_empty());
    }

    #[test]
    fn growth_phase_spends_child_rearing_cost() {
        let mut e = economy(false, false);
        e.household_params.savings_growth_trigger = dec!(50);
        let id = e.add_household(&household_seed(dec!(1000)));

        // Tick 1: 300 saved locally, which crosses the trigger.
        let first = run_tick(&mut e).unwrap();
        assert_eq!(first.growth_entries, 1);

        // Tick 2: the full cost of 200 is drawn and spent.
        let second = run_tick(&mut e).unwrap();
        assert_eq!(second.child_rearing, dec!(200));
        assert!(second.anomalies.is_empty());
        let h = e.household(id).unwrap();
        assert!(h.child_cost_covered);
        assert_eq!(h.local_savings, dec!(100));
    }

    #[test]
    fn fiscal_levies_are_booked() {
        let mut e = economy(true, false);
        let seed = HouseholdSeed {
            land_area: dec!(100),
            environmental_impact: dec!(20),
            ..household_seed(dec!(1000))
        };
        e.add_household(&seed);

        let summary = run_tick(&mut e).unwrap();
        // Land 100 × 0.05 plus impact 20 × 0.02.
        assert_eq!(summary.state_taxes, dec!(5.4));
        // Agency tax 20 × 0.02, penalty (20 − 10) × 5.
        assert_eq!(summary.env_tax, dec!(0.4));
        assert_eq!(summary.penalties, dec!(50));
        assert_eq!(e.ledger.total_for_flow(FlowKind::Transfer), dec!(0.4));
        assert!(summary.anomalies.is_empty());
    }

    #[test]
    fn released_worker_reports_no_income() {
        let mut e = economy(true, false);
        let id = e.add_household(&household_seed(Decimal::ZERO));
        e.add_company(&company_seed(dec!(1000)));

        run_tick(&mut e).unwrap();
        run_tick(&mut e).unwrap();
        assert_eq!(e.household(id).unwrap().income, dec!(10));

        e.companies.first_mut().unwrap().set_balance(dec!(-1000));
        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.bankruptcies.len(), 1);
        assert_eq!(summary.employed, 0);
        assert_eq!(e.household(id).unwrap().income, Decimal::ZERO);
    }

    #[test]
    fn household_split_founds_a_registered_child() {
        let mut e = economy(true, true);
        e.household_params.savings_growth_trigger = dec!(50);
        e.household_params.growth_threshold = 1;
        let parent = e.add_household(&household_seed(dec!(1000)));

        // Tick 1: 300 deposited, which crosses the trigger.
        let first = run_tick(&mut e).unwrap();
        assert_eq!(first.growth_entries, 1);
        assert_eq!(first.household_splits, 0);

        // Tick 2: 200 spent on the child, then 80% of the remaining 100
        // endows the new household.
        let second = run_tick(&mut e).unwrap();
        assert_eq!(second.household_splits, 1);
        assert_eq!(second.households, 2);
        assert!(second.anomalies.is_empty());

        let child = e.households.iter().find(|h| h.id() != parent).unwrap();
        assert_eq!(child.generation, 1);
        assert_eq!(child.age, 0);
        assert_eq!(child.checking_account, dec!(80));
        assert!(e.workforce.contains(child.id()));
        assert!(e.registry.as_ref().unwrap().is_registered(child.id()));
        assert_eq!(e.ledger.total_for_flow(FlowKind::Endowment), dec!(80));

        let bank = e.bank.as_ref().unwrap();
        assert_eq!(bank.savings_of(parent), dec!(20));
        assert!(!e.household(parent).unwrap().growth_phase);
    }

    #[test]
    fn grown_employer_founds_a_spinoff() {
        let mut e = economy(true, false);
        e.company_params.growth_threshold = 1;
        let parent = e.add_company(&company_seed(dec!(2000)));

        let summary = run_tick(&mut e).unwrap();
        // (2000 - 200) × 0.1 spent on research, the rest split in half.
        assert_eq!(summary.rd_investment, dec!(180));
        assert_eq!(summary.company_spinoffs.len(), 1);
        assert_eq!(summary.active_companies, 2);
        assert!(summary.anomalies.is_empty());

        let spinoff = e.companies.iter().find(|c| c.id() != parent).unwrap();
        assert_eq!(summary.company_spinoffs, vec![spinoff.id()]);
        assert_eq!(spinoff.generation(), 1);
        assert_eq!(spinoff.sight_balance(), dec!(910));
        assert_eq!(e.ledger.total_for_flow(FlowKind::Endowment), dec!(910));
        assert_eq!(e.ledger.total_for_flow(FlowKind::Investment), dec!(180));
        assert_eq!(summary.money_supply, dec!(1820));
    }

    #[test]
    fn households_past_the_last_generation_leave() {
        let mut e = economy(false, false);
        e.household_params.max_generation = 0;
        let id = e.add_household(&household_seed(dec!(100)));
        e.households.first_mut().unwrap().generation = 1;

        let summary = run_tick(&mut e).unwrap();
        assert_eq!(summary.exits, 1);
        assert!(e.household(id).is_err());
        assert!(summary.anomalies.is_empty());
    }
}
