use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;
use wormi_hub_core::{
    CalendarEvent, EventRecord, IcsOptions, LocationKind, UidStrategy,
    display::{format_event_schedule, format_metric_value, format_release, format_short_date},
    export::{FsDownloadHost, export_and_download},
    filters::{
        EVENT_TYPES, EventFilter, LocationFilter, RESOURCE_CATEGORIES, ResourceFilter,
        UPCOMING_LIMIT, upcoming,
    },
    forms::{HostApplication, NewsletterSignup, Submission, VolunteerSignup},
    ics::IcsGenerator,
    parse_timestamp,
    preferences::{Preferences, Theme},
    source::Catalog,
};

use crate::{
    config::{self, DataOptions},
    preferences::PreferenceStore,
};

const APP_NAME: &str = "wormi-hub";

/// Arguments of the `ics` command
pub struct IcsParams {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub url: Option<String>,
    pub output: Option<String>,
    pub random_uid: bool,
}

fn print_event(event: &EventRecord) {
    println!("  [{}] {} ({})", event.id, event.title, event.kind);
    println!("    {}", format_event_schedule(&event.start, &event.end));
    println!("    {}", event.location_line());
    if let Some(ref url) = event.registration_url {
        println!("    Register: {}", url);
    }
}

/// List events, optionally only the next few
pub async fn events_command(
    options: &DataOptions,
    kind: Option<String>,
    city: Option<String>,
    show_upcoming: bool,
) -> Result<()> {
    if let Some(ref kind) = kind {
        if !kind.eq_ignore_ascii_case("all") && !EVENT_TYPES.contains(&kind.as_str()) {
            tracing::warn!("unknown event type '{}', expected one of {:?}", kind, EVENT_TYPES);
        }
    }

    let catalog = Catalog::new(options.open()?);
    let events = catalog.events().await?;

    let filtered: Vec<EventRecord> = EventFilter::new(kind.as_deref(), city.as_deref())
        .apply(&events)
        .into_iter()
        .cloned()
        .collect();

    let shown = if show_upcoming {
        upcoming(&filtered, Utc::now(), UPCOMING_LIMIT)
    } else {
        filtered.iter().collect()
    };

    if shown.is_empty() {
        println!("No events found");
        return Ok(());
    }

    println!("Events ({}):", shown.len());
    for event in shown {
        print_event(event);
    }

    Ok(())
}

/// Save one event as an .ics file
pub async fn export_command(
    options: &DataOptions,
    event_id: String,
    out_dir: Option<String>,
    filename: Option<String>,
) -> Result<()> {
    let catalog = Catalog::new(options.open()?);
    let event = catalog.find_event(&event_id).await?;

    let filename = filename.unwrap_or_else(|| event.ics_filename());
    let host = FsDownloadHost::new(config::download_dir(out_dir))?;
    let generator = IcsGenerator::default();

    println!("Exporting \"{}\"...", event.title);
    let saved = export_and_download(&host, &generator, &event.to_calendar_event(), &filename)?;

    match saved.location {
        Some(path) => println!("✓ Calendar file saved to: {} ({} bytes)", path.display(), saved.size),
        None => println!("✓ Calendar file {} downloaded ({} bytes)", saved.filename, saved.size),
    }

    Ok(())
}

/// Calendar document for an ad hoc event, to a file or stdout
pub fn ics_command(params: IcsParams) -> Result<()> {
    let start = parse_timestamp(&params.start)
        .with_context(|| format!("invalid start time: {}", params.start))?;
    let end = parse_timestamp(&params.end)
        .with_context(|| format!("invalid end time: {}", params.end))?;

    if end < start {
        tracing::warn!("event ends before it starts, generating anyway");
    }

    let event = CalendarEvent {
        title: params.title,
        description: params.description,
        location: params.location,
        start,
        end,
        url: params.url,
    };

    let options = IcsOptions {
        uid_strategy: if params.random_uid {
            UidStrategy::Random
        } else {
            UidStrategy::Timestamp
        },
        ..IcsOptions::default()
    };
    let document = IcsGenerator::new(options).generate(&event);

    match params.output {
        Some(output) => {
            fs::write(&output, document)?;
            println!("✓ ICS file saved to: {}", output);
        }
        None => println!("{}", document),
    }

    Ok(())
}

pub async fn locations_command(
    options: &DataOptions,
    kind: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let kind = match kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(k) if k.eq_ignore_ascii_case("all") => None,
        Some(k) => Some(k.parse::<LocationKind>()?),
    };

    let catalog = Catalog::new(options.open()?);
    let locations = catalog.locations().await?;
    let shown = LocationFilter::new(kind, search.as_deref()).apply(&locations);

    if shown.is_empty() {
        println!("No locations found");
        return Ok(());
    }

    println!("Locations ({}):", shown.len());
    for location in shown {
        let status = if location.active { "" } else { " [inactive]" };
        println!("  {} ({}){}", location.name, location.kind, status);
        println!("    {}, {}", location.address, location.city);
        println!("    Hours: {}", location.hours);
        println!("    Accepted: {}", location.accepted);
        if !location.rules.is_empty() {
            println!("    Rules: {}", location.rules);
        }
    }

    Ok(())
}

pub async fn resources_command(
    options: &DataOptions,
    category: Option<String>,
    search: Option<String>,
) -> Result<()> {
    if let Some(ref category) = category {
        if !category.eq_ignore_ascii_case("all")
            && !RESOURCE_CATEGORIES.contains(&category.as_str())
        {
            tracing::warn!(
                "unknown resource category '{}', expected one of {:?}",
                category,
                RESOURCE_CATEGORIES
            );
        }
    }

    let catalog = Catalog::new(options.open()?);
    let resources = catalog.resources().await?;
    let shown = ResourceFilter::new(category.as_deref(), search.as_deref()).apply(&resources);

    if shown.is_empty() {
        println!("No resources found");
        return Ok(());
    }

    println!("Resources ({}):", shown.len());
    for resource in shown {
        println!("  {} [{}] v{}", resource.title, resource.category, resource.version);
        println!("    {}", resource.summary);
        println!("    {}", resource.file_url);
    }

    Ok(())
}

/// Metrics and batch QC
pub async fn data_command(options: &DataOptions) -> Result<()> {
    let catalog = Catalog::new(options.open()?);
    let metrics = catalog.metrics().await?;
    let batches = catalog.batches().await?;

    println!("Network metrics:");
    for metric in &metrics {
        println!(
            "  {}: {} (as of {})",
            metric.label,
            format_metric_value(metric),
            format_short_date(&metric.as_of)
        );
    }

    println!("Batches:");
    for batch in &batches {
        println!(
            "  {} {} [{}] released {}",
            batch.batch_code,
            batch.product,
            batch.qc_status,
            format_release(batch.released_at.as_deref())
        );
        println!(
            "    GI {} | respiration {} | C:N {} | EC {} | pH {}",
            batch.tests.gi, batch.tests.respiration, batch.tests.cn, batch.tests.ec, batch.tests.ph
        );
        if !batch.notes.is_empty() {
            println!("    {}", batch.notes);
        }
    }

    Ok(())
}

pub async fn people_command(options: &DataOptions) -> Result<()> {
    let catalog = Catalog::new(options.open()?);
    let people = catalog.people().await?;

    println!("People ({}):", people.len());
    for person in &people {
        match person.link {
            Some(ref link) => println!("  {} - {} ({})", person.name, person.role, link),
            None => println!("  {} - {}", person.name, person.role),
        }
    }

    Ok(())
}

async fn submit_form<S: Submission>(form: S) -> Result<()> {
    // Field problems are reported even with no relay configured
    form.validate()?;

    let relay = config::form_relay()?;
    println!("Submitting {} form...", S::KIND);
    let receipt = relay.submit(&form).await?;
    println!("✓ Thanks! Your {} form was received ({})", receipt.kind, receipt.status);

    Ok(())
}

pub async fn volunteer_command(form: VolunteerSignup) -> Result<()> {
    submit_form(form).await
}

pub async fn host_command(form: HostApplication) -> Result<()> {
    submit_form(form).await
}

pub async fn newsletter_command(form: NewsletterSignup) -> Result<()> {
    submit_form(form).await
}

pub async fn theme_show_command() -> Result<()> {
    let store = PreferenceStore::with_default_dir(APP_NAME)?;
    let preferences = store.load().await;
    println!("Theme: {}", preferences.theme);
    Ok(())
}

pub async fn theme_set_command(theme: String) -> Result<()> {
    let theme: Theme = theme.parse()?;
    let store = PreferenceStore::with_default_dir(APP_NAME)?;
    store.save(&Preferences { theme }).await?;
    println!("✓ Theme set to {}", theme);
    Ok(())
}

pub async fn theme_toggle_command() -> Result<()> {
    let store = PreferenceStore::with_default_dir(APP_NAME)?;
    let mut preferences = store.load().await;
    preferences.theme = preferences.theme.toggle();
    store.save(&preferences).await?;
    println!("✓ Theme switched to {}", preferences.theme);
    Ok(())
}
