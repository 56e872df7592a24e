//! The admin dashboard, vendor page and storefront assembled from in-memory
//! surfaces. The console drives it; tests inspect it.

use std::sync::Arc;
use vista_core::surface::{MemoryContainer, MemoryForm, MemoryPanel, MemorySelect};
use vista_core::{ActionOutcome, RefreshOutcome, Select};

use crate::bookings::{BookingsScreen, BookingsUi};
use crate::destinations::{DestinationsScreen, DestinationsUi};
use crate::storefront::{StorefrontScreen, StorefrontUi};
use crate::users::UsersScreen;
use crate::vendors::{VendorsScreen, VendorsUi};
use crate::venues::{VenuesScreen, VenuesUi};
use crate::AdminState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(clap::ValueEnum)]
pub enum Screen {
    Destinations,
    Venues,
    Bookings,
    Users,
    Vendors,
    Storefront,
}

pub struct PageForms {
    pub destination_add: Arc<MemoryForm>,
    pub destination_edit: Arc<MemoryForm>,
    pub venue_add: Arc<MemoryForm>,
    pub venue_edit: Arc<MemoryForm>,
    pub vendor_add: Arc<MemoryForm>,
    pub vendor_edit: Arc<MemoryForm>,
    pub booking: Arc<MemoryForm>,
}

pub struct PagePanels {
    pub destination_edit: Arc<MemoryPanel>,
    pub venue_edit: Arc<MemoryPanel>,
    pub vendor_edit: Arc<MemoryPanel>,
    pub booking: Arc<MemoryPanel>,
}

pub struct PageSelects {
    /// Destination field of the add-venue form.
    pub venue_destination: Arc<MemorySelect>,
    pub venue_filter: Arc<MemorySelect>,
    /// Venue field of the booking form.
    pub booking_venue: Arc<MemorySelect>,
}

pub struct MemoryPage {
    pub destinations: DestinationsScreen,
    pub venues: VenuesScreen,
    pub bookings: BookingsScreen,
    pub users: UsersScreen,
    pub vendors: VendorsScreen,
    pub storefront: StorefrontScreen,
    pub forms: PageForms,
    pub panels: PagePanels,
    pub selects: PageSelects,
}

impl MemoryPage {
    pub fn new(state: &AdminState) -> Self {
        let selects = PageSelects {
            venue_destination: MemorySelect::with_placeholder("Select Destination"),
            venue_filter: MemorySelect::with_placeholder("All destinations"),
            booking_venue: MemorySelect::with_placeholder("Select Venue"),
        };
        let forms = PageForms {
            destination_add: MemoryForm::new(),
            destination_edit: MemoryForm::new(),
            venue_add: MemoryForm::with_selects(vec![(
                "destination_id",
                selects.venue_destination.clone() as Arc<dyn Select>,
            )]),
            venue_edit: MemoryForm::new(),
            vendor_add: MemoryForm::new(),
            vendor_edit: MemoryForm::new(),
            booking: MemoryForm::with_selects(vec![(
                "venue_id",
                selects.booking_venue.clone() as Arc<dyn Select>,
            )]),
        };
        let panels = PagePanels {
            destination_edit: MemoryPanel::new(),
            venue_edit: MemoryPanel::new(),
            vendor_edit: MemoryPanel::new(),
            booking: MemoryPanel::new(),
        };

        let destinations = DestinationsScreen::new(
            state,
            DestinationsUi {
                list: MemoryContainer::new(),
                add_form: forms.destination_add.clone(),
                edit_form: forms.destination_edit.clone(),
                edit_panel: panels.destination_edit.clone(),
                destination_selects: vec![
                    selects.venue_destination.clone() as Arc<dyn Select>,
                    selects.venue_filter.clone() as Arc<dyn Select>,
                ],
            },
        );
        let venues = VenuesScreen::new(
            state,
            VenuesUi {
                list: MemoryContainer::new(),
                filter: selects.venue_filter.clone(),
                add_form: forms.venue_add.clone(),
                edit_form: forms.venue_edit.clone(),
                edit_panel: panels.venue_edit.clone(),
            },
        );
        let bookings = BookingsScreen::new(
            state,
            BookingsUi {
                pending: MemoryContainer::new(),
                history: MemoryContainer::new(),
            },
        );
        let users = UsersScreen::new(state, MemoryContainer::new());
        let vendors = VendorsScreen::new(
            state,
            VendorsUi {
                table: MemoryContainer::new(),
                add_form: forms.vendor_add.clone(),
                edit_form: forms.vendor_edit.clone(),
                edit_modal: panels.vendor_edit.clone(),
            },
        );
        let storefront = StorefrontScreen::new(
            state,
            StorefrontUi {
                destinations: MemoryContainer::new(),
                booking_form: forms.booking.clone(),
                booking_panel: panels.booking.clone(),
                venue_select: selects.booking_venue.clone(),
            },
        );

        Self {
            destinations,
            venues,
            bookings,
            users,
            vendors,
            storefront,
            forms,
            panels,
            selects,
        }
    }

    pub async fn load(&self, screen: Screen) -> RefreshOutcome {
        match screen {
            Screen::Destinations => self.destinations.load().await,
            Screen::Venues => self.venues.load().await,
            Screen::Bookings => self.bookings.load().await,
            Screen::Users => self.users.load().await,
            Screen::Vendors => self.vendors.load().await,
            Screen::Storefront => self.storefront.load().await,
        }
    }

    pub async fn activate(&self, screen: Screen, key: &str) -> Option<ActionOutcome> {
        match screen {
            Screen::Destinations => self.destinations.activate(key).await,
            Screen::Venues => self.venues.activate(key).await,
            Screen::Bookings => self.bookings.activate(key).await,
            Screen::Users => self.users.activate(key).await,
            Screen::Vendors => self.vendors.activate(key).await,
            Screen::Storefront => self.storefront.activate(key).await,
        }
    }

    pub fn html(&self, screen: Screen) -> String {
        match screen {
            Screen::Destinations => self.destinations.html(),
            Screen::Venues => self.venues.html(),
            Screen::Bookings => self.bookings.html(),
            Screen::Users => self.users.html(),
            Screen::Vendors => self.vendors.html(),
            Screen::Storefront => self.storefront.html(),
        }
    }
}
