use std::collections::HashSet;

use crate::cli::{Cli, Commands, DrillArgs};
use crate::config::Config;
use crate::consts::DEFAULT_CURRENCY;
use crate::core::{
    CostDimension, CostParser, DateFilter, DrillDownKey, ExpansionState, QuarterMapping, Record,
    RecordFilter, all_years, known_descriptions, label_groups, query, search, sort_by_due_date,
    visible_columns,
};
use crate::error::AppError;
use crate::output::{
    DrillTotals, HistoryTableOptions, ListingTableOptions, RollupTableOptions, history_title,
    output_descriptions_json, output_drill_json, output_history_csv, output_listing_csv,
    output_records_json, output_rollup_csv, output_rollup_json, print_drill_panel,
    print_history_table, print_listing_table, print_rollup_table,
};
use crate::source::{
    Credentials, FileSource, FormApiSource, FormKind, LoadResult, RecordSource, load_records,
};
use crate::source::loader::DEFAULT_MAX_PAGES;
use crate::utils::{Timezone, next_months_window, parse_date};

const NO_RECORDS: &str = "No maintenance records found.";
const NO_MEASUREMENTS: &str = "No wheelset measurements found.";

/// Everything a command needs, resolved from CLI flags and the config file
pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) config: &'a Config,
    pub(crate) filter: RecordFilter,
    pub(crate) mapping: QuarterMapping,
    pub(crate) parser: CostParser,
    pub(crate) dimensions: Vec<CostDimension>,
    pub(crate) expansion: ExpansionState,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(cli: &'a Cli, config: &'a Config) -> Result<Self, AppError> {
        let timezone = Timezone::parse(cli.timezone.as_deref())?;
        let dates = match cli.next_months {
            Some(months) => {
                let (since, until) = next_months_window(timezone.today(), months);
                DateFilter::new(Some(since), Some(until))
            }
            None => DateFilter::new(
                cli.since.as_deref().map(parse_date).transpose()?,
                cli.until.as_deref().map(parse_date).transpose()?,
            ),
        };

        Ok(CommandContext {
            cli,
            config,
            filter: RecordFilter {
                descriptions: cli.locos.iter().cloned().collect::<HashSet<_>>(),
                dates,
            },
            mapping: config.quarter_mapping()?,
            parser: CostParser::new(
                config.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                config.decimal_comma.unwrap_or(true),
            ),
            dimensions: config.cost_dimensions(),
            expansion: ExpansionState::from_keys(&cli.expand)?,
        })
    }

    fn max_pages(&self) -> u32 {
        self.config.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }

    fn api_source(
        &self,
        form_id: Option<&str>,
        setting: &'static str,
    ) -> Result<FormApiSource, AppError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(AppError::MissingSetting { name: "base_url" })?;
        let account_id = self
            .config
            .account_id
            .as_deref()
            .ok_or(AppError::MissingSetting { name: "account_id" })?;
        let form_id = form_id.ok_or(AppError::MissingSetting { name: setting })?;
        Ok(FormApiSource::new(
            base_url,
            account_id,
            form_id,
            self.config.page_size(),
            Credentials {
                key_id: self.config.access_key_id(),
                key_secret: self.config.access_key_secret(),
            },
        ))
    }

    fn maintenance_source(&self) -> Result<Box<dyn RecordSource>, AppError> {
        if let Some(pattern) = &self.cli.input {
            return Ok(Box::new(FileSource::new(pattern.clone())));
        }
        Ok(Box::new(
            self.api_source(self.config.form_id.as_deref(), "form_id")?,
        ))
    }

    fn service_event_source(
        &self,
        service_input: Option<&str>,
    ) -> Result<Box<dyn RecordSource>, AppError> {
        if let Some(pattern) = service_input {
            return Ok(Box::new(FileSource::new(pattern)));
        }
        Ok(Box::new(self.api_source(
            self.config.service_event_form_id.as_deref(),
            "service_event_form_id",
        )?))
    }

    /// Snapshot files from `--input` when given, else the wheelset form
    fn wheelset_source(&self) -> Result<Box<dyn RecordSource>, AppError> {
        if let Some(pattern) = &self.cli.input {
            return Ok(Box::new(FileSource::new(pattern.clone())));
        }
        Ok(Box::new(self.api_source(
            self.config.wheelset_form_id.as_deref(),
            "wheelset_form_id",
        )?))
    }

    /// All maintenance records, unfiltered
    fn load_maintenance(&self) -> Result<LoadResult, AppError> {
        let source = self.maintenance_source()?;
        Ok(load_records(
            source.as_ref(),
            FormKind::Maintenance,
            self.max_pages(),
        ))
    }

    fn unit(&self) -> &str {
        self.parser.unit()
    }

    /// Load timing is shown only in debug mode
    fn elapsed(&self, elapsed_ms: f64) -> Option<f64> {
        self.cli.debug.then_some(elapsed_ms)
    }
}

fn handle_rollup(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let loaded = ctx.load_maintenance()?;
    let elapsed_ms = ctx.elapsed(loaded.elapsed_ms);
    let records = ctx.filter.apply(loaded.records);
    if records.is_empty() {
        println!("{NO_RECORDS}");
        return Ok(());
    }

    let groups = label_groups(&ctx.dimensions, &records, &ctx.mapping, &ctx.parser);
    let years = all_years(&groups);
    let columns = visible_columns(&years, &ctx.expansion, &ctx.mapping);

    if ctx.cli.json {
        println!(
            "{}",
            output_rollup_json(&groups, &years, &columns, ctx.unit())
        );
    } else if ctx.cli.csv {
        print!("{}", output_rollup_csv(&groups, &columns));
    } else {
        print_rollup_table(
            &groups,
            &columns,
            RollupTableOptions {
                use_color: ctx.cli.use_color(),
                breakdown: ctx.cli.breakdown,
                unit: ctx.unit(),
                record_count: records.len(),
                elapsed_ms,
            },
        );
    }
    Ok(())
}

fn handle_list(
    ctx: &CommandContext<'_>,
    service_events: bool,
    service_input: Option<&str>,
) -> Result<(), AppError> {
    let loaded = ctx.load_maintenance()?;
    let elapsed_ms = ctx.elapsed(loaded.elapsed_ms);
    let mut records = loaded.records;

    if service_events || service_input.is_some() {
        let source = ctx.service_event_source(service_input)?;
        let events = load_records(source.as_ref(), FormKind::ServiceEvent, ctx.max_pages());
        records.extend(events.records);
    }

    let mut records = ctx.filter.apply(records);
    if records.is_empty() {
        println!("{NO_RECORDS}");
        return Ok(());
    }
    sort_by_due_date(&mut records, ctx.cli.descending());
    let refs: Vec<&Record> = records.iter().collect();

    if ctx.cli.json {
        println!("{}", output_records_json(&refs));
    } else if ctx.cli.csv {
        print!("{}", output_listing_csv(&refs, &ctx.dimensions));
    } else {
        print_listing_table(
            &refs,
            ListingTableOptions {
                use_color: ctx.cli.use_color(),
                dimensions: &ctx.dimensions,
                elapsed_ms,
            },
        );
    }
    Ok(())
}

/// Per-dimension sums over a drill-down result
pub(crate) fn drill_totals(
    records: &[&Record],
    dimensions: &[CostDimension],
    parser: &CostParser,
) -> DrillTotals {
    let per_dimension: Vec<(String, f64)> = dimensions
        .iter()
        .map(|dim| {
            let sum = records
                .iter()
                .map(|r| parser.parse_value(r.field(&dim.field)))
                .sum();
            (dim.label.clone(), sum)
        })
        .collect();
    let total = per_dimension.iter().map(|(_, amount)| amount).sum();
    DrillTotals {
        per_dimension,
        total,
    }
}

fn handle_drill(ctx: &CommandContext<'_>, args: &DrillArgs) -> Result<(), AppError> {
    let loaded = ctx.load_maintenance()?;
    let elapsed_ms = ctx.elapsed(loaded.elapsed_ms);
    let records = ctx.filter.apply(loaded.records);
    if records.is_empty() {
        println!("{NO_RECORDS}");
        return Ok(());
    }

    let key = DrillDownKey {
        year: args.year.clone(),
        quarter: args.quarter.clone(),
        month: args.month.clone(),
        description: args.description.clone(),
    };
    let mut matches = query(&records, &key, &ctx.mapping);
    if let Some(term) = &args.search {
        matches = search(matches, term);
    }
    let totals = drill_totals(&matches, &ctx.dimensions, &ctx.parser);

    if ctx.cli.json {
        println!(
            "{}",
            output_drill_json(&key, &matches, &totals, ctx.unit())
        );
    } else if ctx.cli.csv {
        print!("{}", output_listing_csv(&matches, &ctx.dimensions));
    } else {
        print_drill_panel(
            &key.title(),
            &matches,
            &totals,
            ctx.unit(),
            ListingTableOptions {
                use_color: ctx.cli.use_color(),
                dimensions: &ctx.dimensions,
                elapsed_ms,
            },
        );
    }
    Ok(())
}

fn handle_descriptions(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let loaded = ctx.load_maintenance()?;
    let descriptions = known_descriptions(&loaded.records);
    if descriptions.is_empty() {
        println!("{NO_RECORDS}");
        return Ok(());
    }
    if ctx.cli.json {
        println!("{}", output_descriptions_json(&descriptions));
    } else {
        for description in &descriptions {
            println!("{description}");
        }
    }
    Ok(())
}

fn handle_history(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let source = ctx.wheelset_source()?;
    let loaded = load_records(source.as_ref(), FormKind::Wheelset, ctx.max_pages());
    let elapsed_ms = ctx.elapsed(loaded.elapsed_ms);

    // Measurements carry no due date, so only the locomotive filter applies
    let filter = RecordFilter {
        descriptions: ctx.filter.descriptions.clone(),
        dates: DateFilter::default(),
    };
    let records = filter.apply(loaded.records);
    if records.is_empty() {
        println!("{NO_MEASUREMENTS}");
        return Ok(());
    }
    let refs: Vec<&Record> = records.iter().collect();

    if ctx.cli.json {
        println!("{}", output_records_json(&refs));
    } else if ctx.cli.csv {
        print!("{}", output_history_csv(&refs));
    } else {
        print_history_table(
            &history_title(&ctx.cli.locos),
            &refs,
            HistoryTableOptions {
                use_color: ctx.cli.use_color(),
                elapsed_ms,
            },
        );
    }
    Ok(())
}

/// Dispatch the parsed command
pub(crate) fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let ctx = CommandContext::new(cli, config)?;
    match &cli.command {
        None | Some(Commands::Rollup) => handle_rollup(&ctx),
        Some(Commands::List {
            service_events,
            service_input,
        }) => handle_list(&ctx, *service_events, service_input.as_deref()),
        Some(Commands::Drill(args)) => handle_drill(&ctx, args),
        Some(Commands::Descriptions) => handle_descriptions(&ctx),
        Some(Commands::History) => handle_history(&ctx),
    }
}
