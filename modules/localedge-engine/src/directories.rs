use browser_session::AutomationSession;
use chromiumoxide::Page;
use localedge_common::{
    BusinessListing, Config, DirectoryDescriptor, DirectoryType, EngineError, SubmissionResult,
};
use tracing::{debug, info, warn};

use crate::nav::navigate_settled;

// --- Strategy dispatch ---

/// Closed set of submission strategies. One variant per directory with a
/// bespoke field mapping, plus a generic best-effort strategy for
/// anything unrecognized. The compiler keeps the routing exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStrategy {
    GoogleBusinessProfile,
    Yelp,
    Facebook,
    YellowPages,
    Angi,
    Bbb,
    Generic,
}

impl DirectoryStrategy {
    /// Total routing from directory type to strategy.
    pub fn for_type(directory_type: DirectoryType) -> Self {
        match directory_type {
            DirectoryType::GoogleBusinessProfile => DirectoryStrategy::GoogleBusinessProfile,
            DirectoryType::Yelp => DirectoryStrategy::Yelp,
            DirectoryType::Facebook => DirectoryStrategy::Facebook,
            DirectoryType::YellowPages => DirectoryStrategy::YellowPages,
            DirectoryType::Angi => DirectoryStrategy::Angi,
            DirectoryType::Bbb => DirectoryStrategy::Bbb,
            DirectoryType::Other => DirectoryStrategy::Generic,
        }
    }

    /// The ordered selector plan this strategy fills.
    pub fn plan(&self) -> SubmissionPlan {
        match self {
            DirectoryStrategy::GoogleBusinessProfile => GOOGLE_PLAN,
            DirectoryStrategy::Yelp => YELP_PLAN,
            DirectoryStrategy::Facebook => FACEBOOK_PLAN,
            DirectoryStrategy::YellowPages => YELLOW_PAGES_PLAN,
            DirectoryStrategy::Angi => ANGI_PLAN,
            DirectoryStrategy::Bbb => BBB_PLAN,
            DirectoryStrategy::Generic => GENERIC_PLAN,
        }
    }
}

/// Semantic form fields every strategy tries to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticField {
    BusinessName,
    Address,
    City,
    State,
    Zip,
    Phone,
    Website,
}

impl SemanticField {
    fn label(&self) -> &'static str {
        match self {
            SemanticField::BusinessName => "business_name",
            SemanticField::Address => "address",
            SemanticField::City => "city",
            SemanticField::State => "state",
            SemanticField::Zip => "zip",
            SemanticField::Phone => "phone",
            SemanticField::Website => "website",
        }
    }
}

/// One semantic field with its candidate selectors in priority order.
/// The first selector that matches an element wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldTarget {
    pub field: SemanticField,
    pub selectors: &'static [&'static str],
}

/// Ordered field targets plus submit-control candidates for one strategy.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionPlan {
    pub fields: &'static [FieldTarget],
    pub submit_selectors: &'static [&'static str],
}

const GOOGLE_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &["input[aria-label='Business name']", "input[name='businessName']"],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &["input[aria-label='Street address']", "input[name='address']"],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input[aria-label='City']", "input[name='locality']"],
        },
        FieldTarget {
            field: SemanticField::State,
            selectors: &["input[aria-label='State']", "select[name='administrativeArea']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &["input[aria-label='ZIP code']", "input[name='postalCode']"],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input[aria-label='Phone number']", "input[type='tel']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &["input[aria-label='Website']", "input[name='websiteUrl']"],
        },
    ],
    submit_selectors: &["button[jsname='LgbsSe']", "button[type='submit']"],
};

const YELP_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &["input#yform-business-name", "input[name='name']"],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &["input#yform-address1", "input[name='address1']"],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input#yform-city", "input[name='city']"],
        },
        FieldTarget {
            field: SemanticField::State,
            selectors: &["select#yform-state", "select[name='state']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &["input#yform-zip", "input[name='zip']"],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input#yform-phone", "input[name='phone']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &["input#yform-url", "input[name='url']"],
        },
    ],
    submit_selectors: &["button[data-button='true'][type='submit']", "button[type='submit']"],
};

const FACEBOOK_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &["input[aria-label='Page name']", "input[name='page_name']"],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &["input[aria-label='Address']", "input[name='address']"],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input[aria-label='City']", "input[name='city']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &["input[aria-label='Zip code']", "input[name='zip']"],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input[aria-label='Phone number']", "input[type='tel']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &["input[aria-label='Website']", "input[name='website']"],
        },
    ],
    submit_selectors: &["div[aria-label='Create Page']", "button[type='submit']"],
};

const YELLOW_PAGES_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &["input#business-name", "input[name='businessName']"],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &["input#business-address", "input[name='street']"],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input#business-city", "input[name='city']"],
        },
        FieldTarget {
            field: SemanticField::State,
            selectors: &["select#business-state", "select[name='state']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &["input#business-zip", "input[name='zipCode']"],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input#business-phone", "input[name='phone']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &["input#business-website", "input[name='website']"],
        },
    ],
    submit_selectors: &["button.submit-listing", "button[type='submit']"],
};

const ANGI_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &["input[name='companyName']", "input#company-name"],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &["input[name='streetAddress']", "input#street-address"],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input[name='city']"],
        },
        FieldTarget {
            field: SemanticField::State,
            selectors: &["select[name='state']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &["input[name='postalCode']", "input[name='zip']"],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input[name='phoneNumber']", "input[type='tel']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &["input[name='websiteUrl']"],
        },
    ],
    submit_selectors: &["button[data-testid='submit']", "button[type='submit']"],
};

const BBB_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &["input#businessName", "input[name='organizationName']"],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &["input#address1", "input[name='address']"],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input#city", "input[name='city']"],
        },
        FieldTarget {
            field: SemanticField::State,
            selectors: &["select#state", "select[name='state']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &["input#postalCode", "input[name='postalCode']"],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input#phone", "input[name='phone']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &["input#website", "input[name='website']"],
        },
    ],
    submit_selectors: &["button#submit-listing", "button[type='submit']"],
};

const GENERIC_PLAN: SubmissionPlan = SubmissionPlan {
    fields: &[
        FieldTarget {
            field: SemanticField::BusinessName,
            selectors: &[
                "input[name='business_name']",
                "input[name='businessName']",
                "input[name='company']",
                "input[name='name']",
                "input[placeholder*='usiness name']",
            ],
        },
        FieldTarget {
            field: SemanticField::Address,
            selectors: &[
                "input[name='address']",
                "input[name='street']",
                "input[name='address1']",
                "input[placeholder*='ddress']",
            ],
        },
        FieldTarget {
            field: SemanticField::City,
            selectors: &["input[name='city']", "input[placeholder*='ity']"],
        },
        FieldTarget {
            field: SemanticField::State,
            selectors: &["select[name='state']", "input[name='state']"],
        },
        FieldTarget {
            field: SemanticField::Zip,
            selectors: &[
                "input[name='zip']",
                "input[name='zipcode']",
                "input[name='postal_code']",
                "input[name='postalCode']",
            ],
        },
        FieldTarget {
            field: SemanticField::Phone,
            selectors: &["input[name='phone']", "input[type='tel']"],
        },
        FieldTarget {
            field: SemanticField::Website,
            selectors: &[
                "input[name='website']",
                "input[name='url']",
                "input[type='url']",
            ],
        },
    ],
    submit_selectors: &[
        "button[type='submit']",
        "input[type='submit']",
        "form button",
    ],
};

/// The value a semantic field takes from the listing. Empty values are
/// skipped rather than typed.
pub fn value_for<'a>(field: SemanticField, listing: &'a BusinessListing) -> &'a str {
    match field {
        SemanticField::BusinessName => &listing.name,
        SemanticField::Address => &listing.address,
        SemanticField::City => &listing.city,
        SemanticField::State => &listing.state,
        SemanticField::Zip => &listing.zip,
        SemanticField::Phone => &listing.phone,
        SemanticField::Website => &listing.website,
    }
}

// --- Execution ---

/// Attempt a citation submission against one directory.
///
/// Best-effort per field: a field with no matching selector is skipped,
/// not fatal. A run that filled zero fields is reported as
/// low-confidence instead of a plain success. Like `extract`, this never
/// returns an error; faults become tagged `Failed` results.
pub async fn submit(
    session: &AutomationSession,
    directory: &DirectoryDescriptor,
    listing: &BusinessListing,
    config: &Config,
) -> SubmissionResult {
    let strategy = DirectoryStrategy::for_type(directory.directory_type);
    info!(
        directory = directory.name.as_str(),
        strategy = ?strategy,
        "Submitting citation"
    );

    match submit_inner(session, directory, listing, config, strategy).await {
        Ok(fields_filled) if fields_filled > 0 => {
            info!(
                directory = directory.name.as_str(),
                fields_filled, "Citation submitted"
            );
            SubmissionResult::Submitted {
                directory: directory.name.clone(),
                fields_filled,
            }
        }
        Ok(_) => {
            warn!(
                directory = directory.name.as_str(),
                "Submission flow ran but no field was filled"
            );
            SubmissionResult::SubmittedLowConfidence {
                directory: directory.name.clone(),
            }
        }
        Err(e) => {
            warn!(directory = directory.name.as_str(), reason = %e.reason(), error = %e, "Submission failed");
            SubmissionResult::Failed {
                directory: directory.name.clone(),
                reason: e.reason(),
                detail: e.to_string(),
            }
        }
    }
}

async fn submit_inner(
    session: &AutomationSession,
    directory: &DirectoryDescriptor,
    listing: &BusinessListing,
    config: &Config,
    strategy: DirectoryStrategy,
) -> Result<u32, EngineError> {
    let page = session
        .open_page()
        .await
        .map_err(|e| EngineError::NavigationFailed {
            url: directory.submission_url.clone(),
            cause: e.to_string(),
        })?;

    let outcome = run_submission(page.page(), directory, listing, config, strategy).await;
    if let Err(e) = page.close().await {
        warn!(directory = directory.name.as_str(), error = %e, "Page close failed after submission");
    }
    outcome
}

async fn run_submission(
    page: &Page,
    directory: &DirectoryDescriptor,
    listing: &BusinessListing,
    config: &Config,
    strategy: DirectoryStrategy,
) -> Result<u32, EngineError> {
    navigate_settled(
        page,
        &directory.submission_url,
        &config.user_agent,
        config.nav_timeout_secs,
    )
    .await?;

    let plan = strategy.plan();
    let mut fields_filled = 0u32;

    for target in plan.fields {
        let value = value_for(target.field, listing);
        if value.is_empty() {
            continue;
        }
        // A missing field is non-fatal; the strategy keeps going.
        match fill_first_match(page, target.field, target.selectors, value).await {
            Ok(()) => fields_filled += 1,
            Err(e) => debug!(
                directory = directory.name.as_str(),
                field = target.field.label(),
                error = %e,
                "Field skipped"
            ),
        }
    }

    // A missing submit control is non-fatal too: the filled form stays
    // on screen and the result's field count still reflects what happened.
    if let Err(e) = click_submit(page, plan.submit_selectors).await {
        warn!(directory = directory.name.as_str(), error = %e, "Form left unsubmitted");
    }

    Ok(fields_filled)
}

/// Try selectors in priority order; type the value into the first match.
/// Element-level faults move on to the next candidate.
async fn fill_first_match(
    page: &Page,
    field: SemanticField,
    selectors: &[&str],
    value: &str,
) -> Result<(), EngineError> {
    for selector in selectors {
        if let Ok(element) = page.find_element(*selector).await {
            let typed = async {
                element.click().await?;
                element.type_str(value).await?;
                Ok::<_, chromiumoxide::error::CdpError>(())
            }
            .await;
            if typed.is_ok() {
                return Ok(());
            }
        }
    }
    Err(EngineError::SubmissionFieldNotFound {
        field: field.label().to_string(),
    })
}

/// Click the first matching submit control.
async fn click_submit(page: &Page, selectors: &[&str]) -> Result<(), EngineError> {
    for selector in selectors {
        if let Ok(element) = page.find_element(*selector).await {
            if element.click().await.is_ok() {
                return Ok(());
            }
        }
    }
    Err(EngineError::SubmissionSubmitNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_directory_types_route_to_generic() {
        assert_eq!(
            DirectoryStrategy::for_type(DirectoryType::Other),
            DirectoryStrategy::Generic
        );
        assert_eq!(
            DirectoryStrategy::for_type(DirectoryType::Yelp),
            DirectoryStrategy::Yelp
        );
    }

    #[test]
    fn every_plan_has_fields_and_a_submit_control() {
        let strategies = [
            DirectoryStrategy::GoogleBusinessProfile,
            DirectoryStrategy::Yelp,
            DirectoryStrategy::Facebook,
            DirectoryStrategy::YellowPages,
            DirectoryStrategy::Angi,
            DirectoryStrategy::Bbb,
            DirectoryStrategy::Generic,
        ];
        for strategy in strategies {
            let plan = strategy.plan();
            assert!(!plan.fields.is_empty(), "{strategy:?} has no fields");
            assert!(
                !plan.submit_selectors.is_empty(),
                "{strategy:?} has no submit selectors"
            );
            for target in plan.fields {
                assert!(
                    !target.selectors.is_empty(),
                    "{strategy:?} field {:?} has no selectors",
                    target.field
                );
            }
        }
    }

    #[test]
    fn field_values_come_from_the_listing() {
        let listing = BusinessListing {
            name: "Acme Plumbing".into(),
            phone: "(612) 555-0137".into(),
            ..Default::default()
        };
        assert_eq!(value_for(SemanticField::BusinessName, &listing), "Acme Plumbing");
        assert_eq!(value_for(SemanticField::Phone, &listing), "(612) 555-0137");
        assert_eq!(value_for(SemanticField::City, &listing), "");
    }
}
