//! Piecewise quadratic coefficient tables.
//!
//! Each row holds `[c0, c1, c2]` for one segment, quantized as
//! `c0 * 2^29`, `c1 * 2^20` and `c2 * 2^14`. Segments split their octave
//! into equal steps selected by the leading fraction bits of the reduced
//! argument.
//!
//! The `TANH` and `SIGMOID_*` rows form one chain from `2^-10` up to `16`,
//! with `TANH[0]` meeting `SIGMOID_1_2` through `tanh(x) = 2·sigmoid(2x) - 1`.
//! Each row is fitted against the fixed-point evaluation in
//! [`reconstruct`](super::reconstruct) so that its value at the last
//! argument of the segment lands on the next row's `c0` with the same
//! error. Neighbouring segments therefore agree at every shared edge, and
//! the remaining error is the cubic remainder of each segment.

/// `2^(x - 1)` on `[1, 2)`, 32 segments.
pub(super) const EXP2: [[i64; 3]; 32] = [
    [536870915, 726792, 3976],
    [548626855, 742707, 4063],
    [560640220, 758970, 4152],
    [572916644, 775589, 4243],
    [585461885, 792572, 4336],
    [598281831, 809927, 4431],
    [611382491, 827663, 4528],
    [624770028, 845786, 4627],
    [638450707, 864306, 4729],
    [652430960, 883232, 4832],
    [666717338, 902572, 4938],
    [681316546, 922336, 5046],
    [696235435, 942532, 5157],
    [711481005, 963171, 5270],
    [727060411, 984262, 5385],
    [742980964, 1005814, 5503],
    [759250127, 1027838, 5624],
    [775875539, 1050345, 5747],
    [792865004, 1073344, 5873],
    [810226484, 1096847, 6002],
    [827968137, 1120865, 6133],
    [846098272, 1145410, 6267],
    [864625413, 1170490, 6405],
    [883558250, 1196120, 6545],
    [902905656, 1222312, 6688],
    [922676711, 1249077, 6835],
    [942880699, 1276428, 6985],
    [963527098, 1304378, 7138],
    [984625599, 1332940, 7294],
    [1006186087, 1362128, 7454],
    [1028218693, 1391955, 7617],
    [1050733754, 1422434, 7784],
];

/// `1 / x` on `[1, 2)`, 128 segments.
pub(super) const RCP: [[i64; 3]; 128] = [
    [536870912, -1048545, 16196],
    [532709122, -1032352, 15824],
    [528611359, -1016531, 15463],
    [524576158, -1001071, 15112],
    [520602096, -985961, 14773],
    [516687795, -971191, 14443],
    [512831916, -956750, 14123],
    [509033161, -942629, 13814],
    [505290270, -928818, 13512],
    [501602020, -915309, 13220],
    [497967223, -902092, 12936],
    [494384724, -889159, 12660],
    [490853405, -876502, 12390],
    [487372175, -864114, 12130],
    [483939977, -851987, 11877],
    [480555781, -840113, 11631],
    [477218588, -828485, 11390],
    [473927426, -817098, 11158],
    [470681347, -805943, 10931],
    [467479433, -795015, 10709],
    [464320788, -784308, 10494],
    [461204541, -773816, 10285],
    [458129845, -763534, 10083],
    [455095872, -753454, 9884],
    [452101820, -743573, 9691],
    [449146906, -733885, 9503],
    [446230368, -724385, 9318],
    [443351463, -715069, 9141],
    [440509466, -705931, 8967],
    [437703673, -696967, 8798],
    [434933397, -688173, 8632],
    [432197967, -679544, 8470],
    [429496729, -671076, 8313],
    [426829048, -662766, 8160],
    [424194301, -654609, 8009],
    [421591882, -646602, 7864],
    [419021199, -638740, 7720],
    [416481677, -631022, 7583],
    [413972751, -623442, 7446],
    [411493873, -615999, 7315],
    [409044504, -608687, 7185],
    [406624122, -601505, 7058],
    [404232216, -594449, 6933],
    [401868285, -587517, 6813],
    [399531841, -580706, 6697],
    [397222409, -574012, 6581],
    [394939521, -567433, 6469],
    [392682724, -560967, 6359],
    [390451572, -554610, 6251],
    [388245631, -548361, 6145],
    [386064476, -542217, 6042],
    [383907691, -536176, 5943],
    [381774871, -530236, 5846],
    [379665617, -524393, 5750],
    [377579542, -518646, 5655],
    [375516266, -512993, 5562],
    [373475417, -507433, 5474],
    [371456631, -501962, 5386],
    [369459552, -496578, 5297],
    [367483833, -491282, 5214],
    [365529131, -486069, 5131],
    [363595115, -480940, 5052],
    [361681456, -475890, 4971],
    [359787836, -470920, 4893],
    [357913941, -466028, 4819],
    [356059465, -461212, 4746],
    [354224107, -456469, 4672],
    [352407573, -451799, 4600],
    [350609575, -447201, 4531],
    [348829831, -442672, 4461],
    [347068064, -438212, 4394],
    [345324004, -433819, 4328],
    [343597384, -429492, 4265],
    [341887944, -425229, 4201],
    [340195429, -421029, 4139],
    [338519590, -416892, 4080],
    [336860180, -412814, 4018],
    [335216960, -408797, 3961],
    [333589693, -404837, 3902],
    [331978148, -400935, 3846],
    [330382099, -397089, 3791],
    [328801324, -393299, 3738],
    [327235603, -389562, 3685],
    [325684724, -385879, 3634],
    [324148475, -382247, 3583],
    [322626651, -378666, 3532],
    [321119050, -375135, 3482],
    [319625473, -371654, 3435],
    [318145725, -368220, 3386],
    [316679616, -364834, 3339],
    [315226958, -361496, 3296],
    [313787565, -358202, 3251],
    [312361258, -354953, 3207],
    [310947859, -351748, 3163],
    [309547192, -348585, 3118],
    [308159089, -345467, 3079],
    [306783378, -342389, 3038],
    [305419896, -339352, 2997],
    [304068481, -336356, 2958],
    [302728972, -333398, 2917],
    [301401214, -330481, 2881],
    [300085051, -327601, 2844],
    [298780333, -324758, 2806],
    [297486912, -321953, 2771],
    [296204641, -319183, 2734],
    [294933376, -316449, 2699],
    [293672978, -313751, 2666],
    [292423305, -311085, 2629],
    [291184223, -308455, 2598],
    [289955598, -305858, 2566],
    [288737297, -303292, 2531],
    [287529191, -300760, 2501],
    [286331153, -298259, 2470],
    [285143057, -295789, 2440],
    [283964780, -293349, 2408],
    [282796200, -290940, 2380],
    [281637199, -288560, 2351],
    [280487660, -286209, 2321],
    [279347466, -283887, 2294],
    [278216505, -281594, 2268],
    [277094664, -279327, 2239],
    [275981834, -277088, 2213],
    [274877907, -274876, 2187],
    [273782776, -272690, 2160],
    [272696336, -270530, 2135],
    [271618485, -268396, 2110],
    [270549121, -266287, 2086],
    [269488144, -264202, 2060],
];

/// `tanh(x)` on `[2^e, 2^(e+1))` for `e` in `-2..=-10`, 8 segments each.
///
/// Row `k` covers exponent `-2 - k`.
pub(super) const TANH: [[[i64; 3]; 8]; 9] = [
    [
        [131489702, 985806, -3966],
        [147135686, 969937, -4332],
        [162516054, 952599, -4669],
        [177608230, 933918, -4977],
        [192391654, 914008, -5251],
        [206847750, 892999, -5492],
        [220959990, 871024, -5701],
        [234713942, 848209, -5875],
    ],
    [
        [66761510, 1032402, -2127],
        [75003710, 1028151, -2363],
        [83210014, 1023425, -2593],
        [91376670, 1018236, -2819],
        [99500006, 1012595, -3042],
        [107576430, 1006512, -3260],
        [115602446, 999994, -3469],
        [123574646, 993055, -3673],
    ],
    [
        [33510810, 1044501, -1082],
        [37686650, 1043420, -1208],
        [41857914, 1042213, -1333],
        [46024100, 1040880, -1456],
        [50184708, 1039425, -1582],
        [54339244, 1037845, -1704],
        [58487216, 1036142, -1825],
        [62628134, 1034316, -1944],
    ],
    [
        [16771757, 1047555, -542],
        [18866596, 1047283, -604],
        [20960860, 1046980, -670],
        [23054485, 1046645, -734],
        [25147408, 1046278, -798],
        [27239565, 1045880, -862],
        [29330894, 1045449, -926],
        [31421329, 1044987, -986],
    ],
    [
        [8387925, 1048321, -272],
        [9436212, 1048253, -304],
        [10484427, 1048177, -336],
        [11532562, 1048093, -368],
        [12580609, 1048000, -400],
        [13628559, 1047901, -432],
        [14676406, 1047794, -464],
        [15724142, 1047677, -496],
    ],
    [
        [4194219, 1048512, -133],
        [4718471, 1048493, -149],
        [5242713, 1048476, -165],
        [5766946, 1048455, -181],
        [6291168, 1048432, -197],
        [6815378, 1048407, -213],
        [7339575, 1048380, -229],
        [7863758, 1048350, -251],
    ],
    [
        [2097141, 1048562, -65],
        [2359281, 1048554, -73],
        [2621419, 1048551, -87],
        [2883556, 1048547, -95],
        [3145692, 1048539, -97],
        [3407826, 1048535, -105],
        [3669959, 1048528, -119],
        [3932090, 1048520, -127],
    ],
    [
        [1048575, 1048569, -37],
        [1179646, 1048569, -41],
        [1310717, 1048577, -45],
        [1441789, 1048569, -49],
        [1572860, 1048561, -53],
        [1703930, 1048569, -57],
        [1835001, 1048561, -61],
        [1966071, 1048561, -65],
    ],
    [
        [524288, 1048576, -14],
        [589824, 1048576, -16],
        [655360, 1048576, -18],
        [720896, 1048560, -20],
        [786431, 1048576, -22],
        [851967, 1048576, -24],
        [917503, 1048576, -26],
        [983039, 1048576, -28],
    ],
];

/// `sigmoid(x)` on `[1, 2)`, 8 segments.
pub(super) const SIGMOID_1_2: [[i64; 3]; 8] = [
    [392484099, 206202, -760],
    [405291907, 194026, -781],
    [417309699, 181516, -788],
    [428523267, 168892, -782],
    [438931971, 156360, -766],
    [448546819, 144090, -742],
    [457388675, 132213, -711],
    [465486275, 120838, -675],
];

/// `sigmoid(x)` on `[2, 4)`, 16 segments.
pub(super) const SIGMOID_2_4: [[i64; 3]; 16] = [
    [472874307, 110041, -635],
    [479591811, 99881, -593],
    [485680579, 90394, -551],
    [491183683, 81583, -508],
    [496144899, 73450, -466],
    [500607107, 65987, -426],
    [504612163, 59168, -388],
    [508200259, 52958, -352],
    [511409347, 47324, -318],
    [514275267, 42233, -287],
    [516831235, 37639, -258],
    [519108035, 33512, -232],
    [521134019, 29807, -208],
    [522935171, 26486, -186],
    [524535043, 23516, -166],
    [525955075, 20865, -148],
];

/// `sigmoid(x)` on `[4, 8)`, 16 segments.
pub(super) const SIGMOID_4_8: [[i64; 3]; 16] = [
    [527214659, 18437, -124],
    [529320643, 14472, -98],
    [530972355, 11338, -77],
    [532265923, 8881, -61],
    [533277763, 6945, -48],
    [534068419, 5415, -37],
    [534685763, 4228, -29],
    [535167555, 3304, -23],
    [535543363, 2578, -18],
    [535836483, 2009, -14],
    [536064963, 1568, -11],
    [536243139, 1211, -8],
    [536381763, 957, -7],
    [536489923, 738, -5],
    [536574147, 577, -4],
    [536639811, 447, -3],
];

/// `sigmoid(x)` on `[8, 16)`, 32 segments.
pub(super) const SIGMOID_8_16: [[i64; 3]; 32] = [
    [536690883, 343, -2],
    [536730691, 275, -2],
    [536761795, 204, -1],
    [536785859, 163, -1],
    [536804675, 130, -1],
    [536819267, 105, -1],
    [536830659, 86, -1],
    [536839619, 54, 0],
    [536846531, 42, 0],
    [536851907, 33, 0],
    [536856131, 26, 0],
    [536859459, 19, 0],
    [536861891, 16, 0],
    [536863939, 12, 0],
    [536865475, 9, 0],
    [536866627, 8, 0],
    [536867651, 5, 0],
    [536868291, 5, 0],
    [536868931, 3, 0],
    [536869315, 3, 0],
    [536869699, 2, 0],
    [536869955, 2, 0],
    [536870211, 1, 0],
    [536870339, 1, 0],
    [536870467, 1, 0],
    [536870595, 0, 0],
    [536870595, 1, 0],
    [536870723, 0, 0],
    [536870723, 0, 0],
    [536870723, 1, 0],
    [536870851, 0, 0],
    [536870851, 0, 0],
];
